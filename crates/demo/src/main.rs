use shopfront_demo::AppConfig;

fn main() -> anyhow::Result<()> {
    shopfront_observability::init();

    let config = AppConfig::from_env()?;
    tracing::info!(rate_per_kg = %config.shipping.rate_per_kg(), "shopfront demo starting");

    for scenario in shopfront_demo::run(config)? {
        println!("=== {} ===", scenario.title);
        match scenario.outcome {
            Ok(receipt) => println!("{receipt}"),
            Err(err) => {
                tracing::warn!(scenario = scenario.title, error = %err, "checkout rejected");
                println!("Checkout rejected: {err}");
            }
        }
        println!();
    }

    Ok(())
}
