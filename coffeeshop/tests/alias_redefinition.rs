//! A shared recipe that lists another recipe's identifier as an alias takes
//! that identifier over once it has produced its instance.

use coffeeshop::prelude::*;
use std::sync::Arc;

#[derive(Debug)]
struct ClassName;

#[derive(Debug)]
struct ClassName2;

const CLASS_NAME: &str = r"Vendor\Fully\Qualified\ClassName";
const CLASS_NAME2: &str = r"Vendor\Fully\Qualified\ClassName2";

/// Routes library logs through the test harness; `RUST_LOG` narrows them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn shop() -> CoffeeShop {
    init_tracing();
    let index = SourceIndex::isolated()
        .autoloadable(TypeDefinition::class(CLASS_NAME).constructor(|_| Ok(Arc::new(ClassName) as Instance)))
        .autoloadable(TypeDefinition::class(CLASS_NAME2).constructor(|_| Ok(Arc::new(ClassName2) as Instance)));
    CoffeeShop::open(index).unwrap()
}

fn shared(identifier: &str, alias: &str, fqcn: &str) -> Recipe {
    Recipe::builder(identifier)
        .strategy(Strategy::Shared)
        .alias(alias)
        .fqcn(fqcn)
        .build()
        .unwrap()
}

fn brew<T: Send + Sync + 'static>(shop: &CoffeeShop, identifier: &str) -> Arc<T> {
    shop.brew_as::<T>(identifier, Arguments::new()).unwrap()
}

#[test]
fn obj1_obj2_obj3_uses_obj2() {
    let shop = shop();

    shop.add_recipe(shared("obj1", "filter1", CLASS_NAME)).unwrap();
    let obj1 = brew::<ClassName>(&shop, "obj1");
    let filter1 = brew::<ClassName>(&shop, "filter1");
    assert!(Arc::ptr_eq(&obj1, &filter1));

    shop.add_recipe(shared("obj2", "filter2", CLASS_NAME)).unwrap();
    let obj2 = brew::<ClassName>(&shop, "obj2");
    let filter2 = brew::<ClassName>(&shop, "filter2");
    assert!(Arc::ptr_eq(&obj2, &filter2));
    assert!(!Arc::ptr_eq(&obj1, &obj2));

    shop.add_recipe(shared("obj3_uses_obj2", "obj2", CLASS_NAME2)).unwrap();

    // nothing changes until obj3_uses_obj2 is produced
    assert!(Arc::ptr_eq(&brew::<ClassName>(&shop, "obj2"), &obj2));
    assert_eq!(shop.canonical("obj2"), "obj2");

    let version = shop.alias_version();
    let obj3 = brew::<ClassName2>(&shop, "obj3_uses_obj2");

    let obj2_again = brew::<ClassName2>(&shop, "obj2");
    assert!(Arc::ptr_eq(&obj3, &obj2_again));
    assert!(shop.alias_version() > version);

    let aliases = shop.aliases();
    assert_eq!(aliases["obj2"].target, "obj3_uses_obj2");
    assert_eq!(aliases["obj2"].version, shop.alias_version());
}

#[test]
fn alias_lookup_is_a_single_hop() {
    let shop = shop();
    shop.add_recipe(shared("obj2", "filter2", CLASS_NAME)).unwrap();
    shop.add_recipe(shared("obj3_uses_obj2", "obj2", CLASS_NAME2)).unwrap();

    let obj2 = brew::<ClassName>(&shop, "obj2");
    brew::<ClassName2>(&shop, "obj3_uses_obj2");

    // filter2 still names obj2's own recipe
    assert_eq!(shop.canonical("filter2"), "obj2");
    assert!(Arc::ptr_eq(&brew::<ClassName>(&shop, "filter2"), &obj2));
}

#[test]
fn redefinition_before_first_brew() {
    let shop = shop();
    shop.add_recipe(shared("obj2", "filter2", CLASS_NAME)).unwrap();
    shop.add_recipe(shared("obj3_uses_obj2", "obj2", CLASS_NAME2)).unwrap();

    let obj3 = brew::<ClassName2>(&shop, "obj3_uses_obj2");
    assert!(Arc::ptr_eq(&brew::<ClassName2>(&shop, "obj2"), &obj3));
    // obj2's own instance was never brewed
    assert!(shop.get("filter2").is_none());
}

#[test]
fn overlapping_aliases_are_rejected() {
    let shop = shop();
    shop.add_recipe(shared("obj1", "filter", CLASS_NAME)).unwrap();

    match shop.add_recipe(shared("obj2", "filter", CLASS_NAME)) {
        Err(CoffeeShopError::DuplicateAlias(err)) => {
            assert_eq!(err.alias, "filter");
            assert_eq!(err.recipe, "obj2");
            assert_eq!(err.existing, "obj1");
        }
        other => panic!("Expected DuplicateAlias, got: {other:?}"),
    }

    // an identifier cannot shadow an alias either
    assert!(matches!(
        shop.add_recipe(Recipe::new("filter", Strategy::New).unwrap()),
        Err(CoffeeShopError::DuplicateAlias(_))
    ));
}

#[test]
fn overriding_a_recipe_drops_its_aliases() {
    let shop = CoffeeShop::builder()
        .locator(
            SourceIndex::isolated()
                .autoloadable(TypeDefinition::class(CLASS_NAME).constructor(|_| Ok(Arc::new(ClassName) as Instance))),
        )
        .allow_override(true)
        .recipe(shared("obj1", "filter1", CLASS_NAME))
        .build()
        .unwrap();

    shop.add_recipe(shared("obj1", "other1", CLASS_NAME)).unwrap();

    assert_eq!(shop.canonical("other1"), "obj1");
    assert_eq!(shop.canonical("filter1"), "filter1");
    assert!(!shop.has("filter1"));
}

#[test]
fn overriding_a_shared_recipe_drops_its_instance() {
    let shop = CoffeeShop::builder()
        .locator(
            SourceIndex::isolated()
                .autoloadable(TypeDefinition::class(CLASS_NAME).constructor(|_| Ok(Arc::new(ClassName) as Instance)))
                .autoloadable(TypeDefinition::class(CLASS_NAME2).constructor(|_| Ok(Arc::new(ClassName2) as Instance))),
        )
        .allow_override(true)
        .build()
        .unwrap();

    shop.add_recipe(shared("svc", "service", CLASS_NAME)).unwrap();
    brew::<ClassName>(&shop, "svc");

    shop.add_recipe(shared("svc", "service", CLASS_NAME2)).unwrap();
    assert!(shop.get("svc").is_none());

    let replaced = brew::<ClassName2>(&shop, "svc");
    assert!(Arc::ptr_eq(&replaced, &brew::<ClassName2>(&shop, "service")));
}

#[test]
fn overriding_a_wildcard_recipe_drops_what_it_brewed() {
    let shop = CoffeeShop::builder()
        .locator(
            SourceIndex::isolated()
                .autoloadable(TypeDefinition::class("EE_Config").constructor(|_| Ok(Arc::new(ClassName) as Instance)))
                .autoloadable(TypeDefinition::class("EE_Registry").constructor(|_| Ok(Arc::new(ClassName) as Instance))),
        )
        .allow_override(true)
        .recipe(Recipe::new("EE_*", Strategy::Shared).unwrap())
        .recipe(Recipe::new("EE_Registry", Strategy::Shared).unwrap())
        .build()
        .unwrap();

    brew::<ClassName>(&shop, "EE_Config");
    let registry = brew::<ClassName>(&shop, "EE_Registry");

    shop.add_recipe(Recipe::new("EE_*", Strategy::New).unwrap()).unwrap();

    assert!(shop.get("EE_Config").is_none());
    // served by its own exact recipe, untouched
    assert!(Arc::ptr_eq(&shop.get("EE_Registry").unwrap().downcast::<ClassName>().unwrap(), &registry));
}
