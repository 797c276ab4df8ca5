//! In-process store implementing every repository trait.
//!
//! Selected by a `memory:` database URL. Each call takes the state lock once,
//! so every operation is atomic with respect to the others.

use crate::traits::{
    CartRepository, CategoryRepository, OrderRepository, ProductRepository, UserRepository,
};
use async_trait::async_trait;
use emporium_core::{
    Cart, CartId, CartItem, Category, CategoryId, EmporiumError, EmporiumResult, Order, OrderId,
    OrderStatus, Product, ProductId, User, UserId,
};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Default)]
struct State {
    users: BTreeMap<UserId, User>,
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    carts: HashMap<UserId, Cart>,
    cart_owners: HashMap<CartId, UserId>,
    orders: BTreeMap<OrderId, Order>,
}

impl State {
    fn cart_mut(&mut self, cart_id: CartId) -> EmporiumResult<&mut Cart> {
        let owner = self
            .cart_owners
            .get(&cart_id)
            .copied()
            .ok_or_else(|| EmporiumError::not_found("Cart", cart_id))?;
        self.carts
            .get_mut(&owner)
            .ok_or_else(|| EmporiumError::not_found("Cart", cart_id))
    }

    fn username_taken(&self, username: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }

    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.email.as_str().eq_ignore_ascii_case(email) && Some(u.id) != except)
    }

    fn category_name_taken(&self, name: &str, except: Option<CategoryId>) -> bool {
        self.categories
            .values()
            .any(|c| c.name == name && Some(c.id) != except)
    }
}

/// Process-local durable store.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_products(mut products: Vec<Product>) -> Vec<Product> {
    products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    products
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> EmporiumResult<Option<User>> {
        Ok(self.state.read().users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> EmporiumResult<Option<User>> {
        Ok(self
            .state
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> EmporiumResult<Option<User>> {
        Ok(self
            .state
            .read()
            .users
            .values()
            .find(|u| u.email.as_str().eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn exists_by_username(&self, username: &str) -> EmporiumResult<bool> {
        Ok(self.state.read().username_taken(username, None))
    }

    async fn exists_by_email(&self, email: &str) -> EmporiumResult<bool> {
        Ok(self.state.read().email_taken(email, None))
    }

    async fn save(&self, user: &User) -> EmporiumResult<User> {
        let mut state = self.state.write();
        if state.username_taken(&user.username, None) || state.email_taken(user.email.as_str(), None)
        {
            return Err(EmporiumError::conflict(format!(
                "Duplicate user: {}",
                user.username
            )));
        }
        state.users.insert(user.id, user.clone());
        debug!("Stored user {}", user.id);
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> EmporiumResult<User> {
        let mut state = self.state.write();
        if !state.users.contains_key(&user.id) {
            return Err(EmporiumError::not_found("User", user.id));
        }
        if state.username_taken(&user.username, Some(user.id))
            || state.email_taken(user.email.as_str(), Some(user.id))
        {
            return Err(EmporiumError::conflict(format!(
                "Duplicate user: {}",
                user.username
            )));
        }
        state.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> EmporiumResult<bool> {
        let mut state = self.state.write();
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        if let Some(cart) = state.carts.remove(&id) {
            state.cart_owners.remove(&cart.id);
        }
        state.orders.retain(|_, order| order.owner_id != id);
        for product in state.products.values_mut() {
            if product.created_by == Some(id) {
                product.created_by = None;
            }
        }
        Ok(true)
    }

    async fn count(&self) -> EmporiumResult<u64> {
        Ok(self.state.read().users.len() as u64)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_id(&self, id: CategoryId) -> EmporiumResult<Option<Category>> {
        Ok(self.state.read().categories.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> EmporiumResult<Option<Category>> {
        Ok(self
            .state
            .read()
            .categories
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn find_all(&self) -> EmporiumResult<Vec<Category>> {
        let mut categories: Vec<Category> =
            self.state.read().categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn save(&self, category: &Category) -> EmporiumResult<Category> {
        let mut state = self.state.write();
        if state.category_name_taken(&category.name, None) {
            return Err(EmporiumError::conflict(format!(
                "Duplicate category name: {}",
                category.name
            )));
        }
        state.categories.insert(category.id, category.clone());
        Ok(category.clone())
    }

    async fn update(&self, category: &Category) -> EmporiumResult<Category> {
        let mut state = self.state.write();
        if !state.categories.contains_key(&category.id) {
            return Err(EmporiumError::not_found("Category", category.id));
        }
        if state.category_name_taken(&category.name, Some(category.id)) {
            return Err(EmporiumError::conflict(format!(
                "Duplicate category name: {}",
                category.name
            )));
        }
        state.categories.insert(category.id, category.clone());
        Ok(category.clone())
    }

    async fn delete(&self, id: CategoryId) -> EmporiumResult<bool> {
        let mut state = self.state.write();
        if state.products.values().any(|p| p.category_id == id) {
            return Err(EmporiumError::conflict(format!(
                "Category {id} still has products"
            )));
        }
        Ok(state.categories.remove(&id).is_some())
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn find_by_id(&self, id: ProductId) -> EmporiumResult<Option<Product>> {
        Ok(self.state.read().products.get(&id).cloned())
    }

    async fn find_all(&self) -> EmporiumResult<Vec<Product>> {
        Ok(sorted_products(
            self.state.read().products.values().cloned().collect(),
        ))
    }

    async fn find_by_category(&self, category_id: CategoryId) -> EmporiumResult<Vec<Product>> {
        Ok(sorted_products(
            self.state
                .read()
                .products
                .values()
                .filter(|p| p.category_id == category_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_price_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> EmporiumResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .state
            .read()
            .products
            .values()
            .filter(|p| p.priced_between(min, max))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn search(&self, term: &str) -> EmporiumResult<Vec<Product>> {
        Ok(sorted_products(
            self.state
                .read()
                .products
                .values()
                .filter(|p| p.matches_term(term))
                .cloned()
                .collect(),
        ))
    }

    async fn save(&self, product: &Product) -> EmporiumResult<Product> {
        let mut state = self.state.write();
        if !state.categories.contains_key(&product.category_id) {
            return Err(EmporiumError::not_found("Category", product.category_id));
        }
        state.products.insert(product.id, product.clone());
        Ok(product.clone())
    }

    async fn update(&self, product: &Product) -> EmporiumResult<Product> {
        let mut state = self.state.write();
        if !state.products.contains_key(&product.id) {
            return Err(EmporiumError::not_found("Product", product.id));
        }
        if !state.categories.contains_key(&product.category_id) {
            return Err(EmporiumError::not_found("Category", product.category_id));
        }
        state.products.insert(product.id, product.clone());
        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> EmporiumResult<bool> {
        let mut state = self.state.write();
        if state.products.remove(&id).is_none() {
            return Ok(false);
        }
        for cart in state.carts.values_mut() {
            cart.items.retain(|item| item.product_id != id);
        }
        Ok(true)
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn find_by_owner(&self, owner_id: UserId) -> EmporiumResult<Option<Cart>> {
        Ok(self.state.read().carts.get(&owner_id).cloned())
    }

    async fn find_or_create(&self, owner_id: UserId) -> EmporiumResult<Cart> {
        let mut state = self.state.write();
        if let Some(cart) = state.carts.get(&owner_id) {
            return Ok(cart.clone());
        }
        if !state.users.contains_key(&owner_id) {
            return Err(EmporiumError::not_found("User", owner_id));
        }
        let cart = Cart::new(owner_id);
        debug!("Creating cart {} for user: {}", cart.id, owner_id);
        state.cart_owners.insert(cart.id, owner_id);
        state.carts.insert(owner_id, cart.clone());
        Ok(cart)
    }

    async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> EmporiumResult<CartItem> {
        let mut state = self.state.write();
        if !state.products.contains_key(&product_id) {
            return Err(EmporiumError::not_found("Product", product_id));
        }
        let cart = state.cart_mut(cart_id)?;
        cart.add_quantity(product_id, quantity)?;
        cart.item_for(product_id)
            .cloned()
            .ok_or_else(|| EmporiumError::internal("cart line vanished during add"))
    }

    async fn set_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> EmporiumResult<bool> {
        let mut state = self.state.write();
        Ok(state.cart_mut(cart_id)?.set_quantity(product_id, quantity))
    }

    async fn remove_item(&self, cart_id: CartId, product_id: ProductId) -> EmporiumResult<bool> {
        let mut state = self.state.write();
        Ok(state.cart_mut(cart_id)?.remove(product_id))
    }

    async fn clear(&self, cart_id: CartId) -> EmporiumResult<u64> {
        let mut state = self.state.write();
        let cart = state.cart_mut(cart_id)?;
        let removed = cart.items.len() as u64;
        cart.clear();
        Ok(removed)
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn create(&self, order: &Order) -> EmporiumResult<Order> {
        let mut state = self.state.write();
        if !state.users.contains_key(&order.owner_id) {
            return Err(EmporiumError::not_found("User", order.owner_id));
        }
        if state.orders.contains_key(&order.id) {
            return Err(EmporiumError::conflict(format!(
                "Order {} already exists",
                order.id
            )));
        }
        state.orders.insert(order.id, order.clone());
        debug!("Stored order {}", order.id);
        Ok(order.clone())
    }

    async fn find_by_id(&self, id: OrderId) -> EmporiumResult<Option<Order>> {
        Ok(self.state.read().orders.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner_id: UserId) -> EmporiumResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .state
            .read()
            .orders
            .values()
            .filter(|o| o.owner_id == owner_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> EmporiumResult<bool> {
        let mut state = self.state.write();
        match state.orders.get_mut(&id) {
            Some(order) => {
                order.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emporium_core::{Email, UserRole};
    use std::sync::Arc;

    fn user(name: &str) -> User {
        User::new(
            name,
            Email::new(format!("{name}@shop.example")).unwrap(),
            UserRole::Customer,
        )
    }

    async fn seeded() -> (InMemoryStore, User, Product) {
        let store = InMemoryStore::new();
        let buyer = UserRepository::save(&store, &user("buyer")).await.unwrap();
        let category = CategoryRepository::save(&store, &Category::new("Lighting", None))
            .await
            .unwrap();
        let product = ProductRepository::save(
            &store,
            &Product::new("Lamp", "Desk lamp", Decimal::new(10, 0), 5, category.id),
        )
        .await
        .unwrap();
        (store, buyer, product)
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let store = InMemoryStore::new();
        UserRepository::save(&store, &user("alice")).await.unwrap();

        let mut twin = user("alice");
        twin.email = Email::new("other@shop.example").unwrap();
        let err = UserRepository::save(&store, &twin).await.unwrap_err();
        assert!(matches!(err, EmporiumError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_insensitive() {
        let store = InMemoryStore::new();
        UserRepository::save(&store, &user("carol")).await.unwrap();
        assert!(store.exists_by_email("CAROL@shop.example").await.unwrap());
        assert!(store
            .find_by_email("Carol@Shop.Example")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_find_or_create_is_stable() {
        let (store, buyer, _) = seeded().await;
        let first = store.find_or_create(buyer.id).await.unwrap();
        let second = store.find_or_create(buyer.id).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_find_or_create_unknown_user() {
        let store = InMemoryStore::new();
        let err = store.find_or_create(UserId::new()).await.unwrap_err();
        assert!(matches!(err, EmporiumError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_add_item_increments_existing_line() {
        let (store, buyer, product) = seeded().await;
        let cart = store.find_or_create(buyer.id).await.unwrap();

        store.add_item(cart.id, product.id, 2).await.unwrap();
        let line = store.add_item(cart.id, product.id, 3).await.unwrap();

        assert_eq!(line.quantity, 5);
        let cart = CartRepository::find_by_owner(&store, buyer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cart.items.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let (store, buyer, product) = seeded().await;
        let store = Arc::new(store);
        let cart = store.find_or_create(buyer.id).await.unwrap();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.add_item(cart.id, product.id, 1).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let cart = CartRepository::find_by_owner(&*store, buyer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cart.item_for(product.id).unwrap().quantity, 32);
    }

    #[tokio::test]
    async fn test_deleting_product_drops_cart_lines() {
        let (store, buyer, product) = seeded().await;
        let cart = store.find_or_create(buyer.id).await.unwrap();
        store.add_item(cart.id, product.id, 1).await.unwrap();

        assert!(ProductRepository::delete(&store, product.id).await.unwrap());

        let cart = CartRepository::find_by_owner(&store, buyer.id)
            .await
            .unwrap()
            .unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_category_with_products_cannot_be_deleted() {
        let (store, _, product) = seeded().await;
        let err = CategoryRepository::delete(&store, product.category_id)
            .await
            .unwrap_err();
        assert!(matches!(err, EmporiumError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_orders_listed_newest_first() {
        let (store, buyer, product) = seeded().await;
        let mut older = Order::place(buyer.id);
        older.placed_at -= chrono::Duration::minutes(5);
        older.add_line(product.id, 1, product.price);
        let mut newer = Order::place(buyer.id);
        newer.add_line(product.id, 2, product.price);

        store.create(&older).await.unwrap();
        store.create(&newer).await.unwrap();

        let orders = OrderRepository::find_by_owner(&store, buyer.id).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, newer.id);
        assert!(store
            .update_status(older.id, OrderStatus::Paid)
            .await
            .unwrap());
        assert!(!store
            .update_status(OrderId::new(), OrderStatus::Paid)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_price_range_and_search() {
        let (store, _, product) = seeded().await;
        let hits = store
            .find_by_price_range(Decimal::new(5, 0), Decimal::new(10, 0))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(store.search("DESK").await.unwrap()[0].id, product.id);
        assert!(store.search("sofa").await.unwrap().is_empty());
    }
}
