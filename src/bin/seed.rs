use chrono::{Duration, Utc};
use mongodb::bson::{DateTime, doc};
use restaurant_db_bootstrap::{
    bootstrap,
    config::AppConfig,
    db::connect,
    models::{Address, Cart, CartItem, Profile, Restaurant, User},
    schema::{carts, restaurants, users},
    state::BootstrapContext,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CART_LIFETIME_HOURS: i64 = 24;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,restaurant_db_bootstrap=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env()?;
    let ctx = connect(&config).await?;

    // Ensure collections and indexes exist before writing documents.
    let report = bootstrap::run(&ctx).await?;
    if !report.is_success() {
        anyhow::bail!("bootstrap reported failures: {}", report.failure_lines().join("; "));
    }

    let user_id = ensure_user(&ctx, "user-demo-0001", "demo@example.com").await?;
    let restaurant_id = ensure_restaurant(&ctx, "rest-demo-0001").await?;
    let cart_id = ensure_cart(&ctx, "cart-demo-0001", &user_id, &restaurant_id).await?;

    println!("Seed completed. User: {user_id}, Restaurant: {restaurant_id}, Cart: {cart_id}");
    Ok(())
}

async fn ensure_user(ctx: &BootstrapContext, user_id: &str, email: &str) -> anyhow::Result<String> {
    let user = User {
        user_id: user_id.to_string(),
        email: email.to_string(),
        profile: Profile {
            first_name: "Demo".into(),
            last_name: "Customer".into(),
            phone: Some("+1-555-0100".into()),
        },
        created_at: Some(DateTime::now()),
    };

    ctx.database()
        .collection::<User>(users::COLLECTION)
        .replace_one(doc! { "userId": user_id }, &user)
        .upsert(true)
        .await?;

    println!("Ensured user {email}");
    Ok(user.user_id)
}

async fn ensure_restaurant(ctx: &BootstrapContext, restaurant_id: &str) -> anyhow::Result<String> {
    let restaurant = Restaurant {
        restaurant_id: restaurant_id.to_string(),
        name: "Ferris Trattoria".into(),
        cuisine: "Italian".into(),
        address: Address {
            street: "1 Crab Lane".into(),
            city: "Portland".into(),
            zip_code: "97201".into(),
            country: Some("US".into()),
        },
        is_active: Some(true),
    };

    ctx.database()
        .collection::<Restaurant>(restaurants::COLLECTION)
        .replace_one(doc! { "restaurantId": restaurant_id }, &restaurant)
        .upsert(true)
        .await?;

    println!("Ensured restaurant {}", restaurant.name);
    Ok(restaurant.restaurant_id)
}

async fn ensure_cart(
    ctx: &BootstrapContext,
    cart_id: &str,
    customer_id: &str,
    restaurant_id: &str,
) -> anyhow::Result<String> {
    let expires_at = Utc::now() + Duration::hours(CART_LIFETIME_HOURS);
    let mut cart = Cart {
        cart_id: cart_id.to_string(),
        customer_id: customer_id.to_string(),
        restaurant_id: restaurant_id.to_string(),
        items: vec![
            CartItem {
                item_id: "item-margherita".into(),
                name: "Margherita".into(),
                price: 11.5,
                quantity: 2,
            },
            CartItem {
                item_id: "item-tiramisu".into(),
                name: "Tiramisu".into(),
                price: 6.0,
                quantity: 1,
            },
        ],
        total_amount: None,
        expires_at: Some(DateTime::from_millis(expires_at.timestamp_millis())),
    };
    cart.total_amount = Some(cart.computed_total());

    ctx.database()
        .collection::<Cart>(carts::COLLECTION)
        .replace_one(doc! { "cartId": cart_id }, &cart)
        .upsert(true)
        .await?;

    println!("Ensured cart {cart_id} (expires {expires_at})");
    Ok(cart.cart_id)
}
