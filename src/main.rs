#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    gerador_oficios::run().await
}
