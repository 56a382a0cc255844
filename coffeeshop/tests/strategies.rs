use coffeeshop::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug)]
struct Config {
    serial: u32,
}

#[derive(Debug)]
struct AdminPage;

fn config_definition(counter: Arc<AtomicU32>) -> TypeDefinition {
    TypeDefinition::class("EE_Config").constructor(move |_| {
        Ok(Arc::new(Config {
            serial: counter.fetch_add(1, Ordering::SeqCst),
        }) as Instance)
    })
}

/// Sources laid out like a legacy plugin tree.
fn legacy_index(counter: Arc<AtomicU32>) -> Arc<SourceIndex> {
    Arc::new(
        SourceIndex::isolated()
            .source(
                "interfaces/EEI_Base.interfaces.php",
                [TypeDefinition::interface("EEI_Base")],
            )
            .source("core/EE_Config.core.php", [config_definition(counter)])
            .source(
                "admin/EE_Admin_Page.core.php",
                [TypeDefinition::class("EE_Admin_Page").constructor(|_| Ok(Arc::new(AdminPage) as Instance))],
            )
            .source("models/EEM_Event.model.php", [TypeDefinition::class("EEM_Event")])
            .source("models/legacy/EEM_Event.model.php", [TypeDefinition::class("EEM_Event")]),
    )
}

fn legacy_shop(index: Arc<SourceIndex>) -> CoffeeShop {
    CoffeeShop::builder()
        .shared_locator(index)
        .recipe(
            Recipe::builder("EEI_*")
                .strategy(Strategy::LoadOnly)
                .paths(["interfaces/*.php", "interfaces/*.interfaces.php"])
                .build()
                .unwrap(),
        )
        .recipe(
            Recipe::builder("EEM_*")
                .strategy(Strategy::Shared)
                .path("models/**/*.model.php")
                .build()
                .unwrap(),
        )
        .recipe(
            Recipe::builder("EE_*")
                .strategy(Strategy::Shared)
                .paths(["core/*.core.php", "admin/*.core.php"])
                .build()
                .unwrap(),
        )
        .recipe(
            Recipe::builder("EE_Admin_Page*")
                .strategy(Strategy::LoadOnly)
                .path("admin/*.core.php")
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

#[test]
fn new_brews_a_fresh_instance_every_time() {
    let counter = Arc::new(AtomicU32::new(0));
    let shop = CoffeeShop::builder()
        .locator(SourceIndex::isolated().autoloadable(config_definition(counter.clone())))
        .recipe(Recipe::new("EE_Config", Strategy::New).unwrap())
        .build()
        .unwrap();

    let a = shop.brew_as::<Config>("EE_Config", Arguments::new()).unwrap();
    let b = shop.brew_as::<Config>("EE_Config", Arguments::new()).unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!((a.serial, b.serial), (0, 1));
    assert!(shop.get("EE_Config").is_none());
}

#[test]
fn shared_brews_once() {
    let counter = Arc::new(AtomicU32::new(0));
    let shop = CoffeeShop::builder()
        .locator(SourceIndex::isolated().autoloadable(config_definition(counter.clone())))
        .recipe(
            Recipe::builder("EE_Config")
                .strategy(Strategy::Shared)
                .alias("config")
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let a = shop.brew_as::<Config>("EE_Config", Arguments::new()).unwrap();
    let b = shop.brew_as::<Config>("config", Arguments::new()).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(shop.get("config").is_some());
}

#[test]
fn load_only_loads_once_and_never_instantiates() {
    let index = legacy_index(Arc::new(AtomicU32::new(0)));
    let shop = legacy_shop(index.clone());

    for _ in 0..3 {
        let brewed = shop.brew("EEI_Base", Arguments::new()).unwrap();
        assert!(brewed.is_loaded_only());
        match brewed {
            Brewed::Loaded { type_name } => assert_eq!(type_name, "EEI_Base"),
            other => panic!("Expected Loaded, got: {other:?}"),
        }
    }
    assert_eq!(index.load_count(), 1);
}

#[test]
fn longest_wildcard_prefix_wins() {
    let counter = Arc::new(AtomicU32::new(0));
    let shop = legacy_shop(legacy_index(counter.clone()));

    // EE_Admin_Page* beats EE_*
    let brewed = shop.brew("EE_Admin_Page", Arguments::new()).unwrap();
    assert!(brewed.is_loaded_only());

    // EE_* is shared
    let a = shop.brew_as::<Config>("EE_Config", Arguments::new()).unwrap();
    let b = shop.brew_as::<Config>("EE_Config", Arguments::new()).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn exact_recipe_beats_wildcard() {
    let counter = Arc::new(AtomicU32::new(0));
    let index = legacy_index(counter.clone());
    let shop = legacy_shop(index);
    shop.add_recipe(
        Recipe::builder("EE_Config")
            .strategy(Strategy::New)
            .path("core/*.core.php")
            .build()
            .unwrap(),
    )
    .unwrap();

    let a = shop.brew_as::<Config>("EE_Config", Arguments::new()).unwrap();
    let b = shop.brew_as::<Config>("EE_Config", Arguments::new()).unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn several_matching_sources_are_ambiguous() {
    let shop = legacy_shop(legacy_index(Arc::new(AtomicU32::new(0))));

    match shop.brew("EEM_Event", Arguments::new()) {
        Err(CoffeeShopError::AmbiguousDefinition(err)) => {
            assert_eq!(err.identifier, "EEM_Event");
            assert_eq!(err.pattern, "models/**/EEM_Event.model.php");
            assert_eq!(err.candidates.len(), 2);
        }
        other => panic!("Expected AmbiguousDefinition, got: {other:?}"),
    }
}

#[test]
fn wildcard_without_matching_source_is_not_found() {
    let shop = legacy_shop(legacy_index(Arc::new(AtomicU32::new(0))));

    match shop.brew("EE_Registry", Arguments::new()) {
        Err(CoffeeShopError::DefinitionNotFound(err)) => {
            assert_eq!(err.type_name, "EE_Registry");
            assert_eq!(
                err.searched,
                vec!["core/EE_Registry.core.php", "admin/EE_Registry.core.php"]
            );
        }
        other => panic!("Expected DefinitionNotFound, got: {other:?}"),
    }
}

#[test]
fn unregistered_identifier_has_no_recipe() {
    let shop = legacy_shop(legacy_index(Arc::new(AtomicU32::new(0))));

    match shop.brew("Unregistered", Arguments::new()) {
        Err(CoffeeShopError::NoRecipeFound(err)) => assert_eq!(err.requested, "Unregistered"),
        other => panic!("Expected NoRecipeFound, got: {other:?}"),
    }
}

#[test]
fn missing_coffee_maker_is_unknown_strategy() {
    let shop = CoffeeShop::builder()
        .locator(SourceIndex::isolated().autoloadable(config_definition(Arc::new(AtomicU32::new(0)))))
        .without_defaults()
        .coffee_maker(Arc::new(coffeeshop::maker::NewCoffeeMaker::default()), Strategy::New)
        .recipe(Recipe::new("EE_Config", Strategy::LoadOnly).unwrap())
        .build()
        .unwrap();

    assert!(matches!(
        shop.brew("EE_Config", Arguments::new()),
        Err(CoffeeShopError::UnknownStrategy {
            strategy: Strategy::LoadOnly,
            ..
        })
    ));
}

#[test]
fn custom_coffee_maker_replaces_stock_one() {
    struct Counting(AtomicU32);

    impl CoffeeMaker for Counting {
        fn brew(
            &self,
            shop: &CoffeeShop,
            recipe: &Recipe,
            _arguments: &Arguments,
            _ctx: &mut BrewContext,
        ) -> coffeeshop::Result<Brewed> {
            self.0.fetch_add(1, Ordering::SeqCst);
            let definition = shop.ensure_loaded(recipe)?;
            Ok(Brewed::Loaded {
                type_name: definition.name().to_string(),
            })
        }
    }

    let maker = Arc::new(Counting(AtomicU32::new(0)));
    let shop = CoffeeShop::open(SourceIndex::isolated().autoloadable(config_definition(Arc::new(AtomicU32::new(0))))).unwrap();
    shop.add_coffee_maker(maker.clone(), Strategy::New);

    assert!(shop.brew("EE_Config", Arguments::new()).unwrap().is_loaded_only());
    assert_eq!(maker.0.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_shared_brews_agree() {
    let counter = Arc::new(AtomicU32::new(0));
    let shop = Arc::new(
        CoffeeShop::builder()
            .locator(SourceIndex::isolated().autoloadable(config_definition(counter)))
            .recipe(Recipe::new("EE_Config", Strategy::Shared).unwrap())
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let shop = shop.clone();
            std::thread::spawn(move || shop.brew_as::<Config>("EE_Config", Arguments::new()).unwrap())
        })
        .collect();

    let instances: Vec<Arc<Config>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for instance in &instances[1..] {
        assert!(Arc::ptr_eq(&instances[0], instance));
    }
}

#[derive(Debug)]
struct Counter {
    start: u32,
}

#[test]
fn shared_ignores_arguments_after_first_brew() {
    let constructed = Arc::new(AtomicU32::new(0));
    let tally = constructed.clone();
    let shop = CoffeeShop::builder()
        .locator(SourceIndex::isolated().autoloadable(
            TypeDefinition::class("EE_Counter")
                .param(Parameter::new("start"))
                .constructor(move |args| {
                    tally.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::new(Counter { start: args.cloned::<u32>(0)? }) as Instance)
                }),
        ))
        .recipe(Recipe::new("EE_Counter", Strategy::Shared).unwrap())
        .build()
        .unwrap();

    let a = shop.brew_as::<Counter>("EE_Counter", Arguments::new().push(7u32)).unwrap();
    let b = shop.brew_as::<Counter>("EE_Counter", Arguments::new().push(9u32)).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(b.start, 7);
    assert_eq!(constructed.load(Ordering::SeqCst), 1);
}
