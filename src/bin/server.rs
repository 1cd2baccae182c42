#[tokio::main]
async fn main() {
    swimclub_backend::run().await;
}
