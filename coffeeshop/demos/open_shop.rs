//! Opening a CoffeeShop for a legacy plugin layout.
//!
//! Run with `RUST_LOG=coffeeshop_container=trace` for the full resolution trace.

use coffeeshop::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// === Types the "plugin" ships ===

#[derive(Debug, Default, Brewable)]
#[brewable(name = "EE_Registry")]
struct Registry;

#[derive(Debug, Brewable)]
#[brewable(name = "EE_Front_Controller")]
struct FrontController {
    #[brew(id = "EE_Registry")]
    registry: Arc<Registry>,
    #[brew(default)]
    route: String,
}

#[derive(Debug)]
struct ClassName;

#[derive(Debug)]
struct ClassName2;

fn main() -> coffeeshop::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coffeeshop_container=debug")),
        )
        .init();

    // Virtual source tree standing in for the plugin's files
    let index = SourceIndex::new()
        .source("interfaces/EEI_Base.interfaces.php", [TypeDefinition::interface("EEI_Base")])
        .source("core/EE_Registry.core.php", [Registry::definition()])
        .source("core/EE_Front_Controller.core.php", [FrontController::definition()])
        .autoloadable(
            TypeDefinition::class(r"Vendor\Fully\Qualified\ClassName")
                .constructor(|_| Ok(Arc::new(ClassName) as Instance)),
        )
        .autoloadable(
            TypeDefinition::class(r"Vendor\Fully\Qualified\ClassName2")
                .constructor(|_| Ok(Arc::new(ClassName2) as Instance)),
        );

    let menu: Menu = serde_json::from_str(
        r#"{
            "recipes": [
                { "identifier": "EEI_*", "strategy": "load_only",
                  "paths": ["interfaces/*.php", "interfaces/*.interfaces.php"] },
                { "identifier": "EE_*", "strategy": "shared", "paths": ["core/*.core.php"] }
            ]
        }"#,
    )
    .map_err(|e| CoffeeShopError::construction("menu", e))?;

    let shop = CoffeeShop::builder().locator(index).add_provider(&menu).build()?;

    // === Wildcards ===
    let interface = shop.brew("EEI_Base", Arguments::new())?;
    println!("EEI_Base          -> {interface:?}");

    let controller: Arc<FrontController> = shop.brew_as(
        "EE_Front_Controller",
        Arguments::new().with("route", String::from("espresso_events")),
    )?;
    let registry: Arc<Registry> = shop.brew_as("EE_Registry", Arguments::new())?;
    println!(
        "front controller  -> route {:?}, shares registry: {}",
        controller.route,
        Arc::ptr_eq(&controller.registry, &registry)
    );

    // === Alias redefinition ===
    let shared = |identifier: &str, alias: &str, fqcn: &str| {
        Recipe::builder(identifier)
            .strategy(Strategy::Shared)
            .alias(alias)
            .fqcn(fqcn)
            .build()
    };
    shop.add_recipe(shared("obj2", "filter2", r"Vendor\Fully\Qualified\ClassName")?)?;
    shop.add_recipe(shared("obj3_uses_obj2", "obj2", r"Vendor\Fully\Qualified\ClassName2")?)?;

    let before = shop.brew_as::<ClassName>("obj2", Arguments::new())?;
    println!("obj2 (before)     -> {before:?}");

    shop.brew_as::<ClassName2>("obj3_uses_obj2", Arguments::new())?;
    let after = shop.brew_as::<ClassName2>("obj2", Arguments::new())?;
    println!("obj2 (after)      -> {after:?}");

    for (alias, entry) in shop.aliases() {
        println!("alias {alias:<10} -> {} (v{})", entry.target, entry.version);
    }

    println!("\n{shop:?}");
    Ok(())
}
