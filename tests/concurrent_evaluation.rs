//! Integration tests: concurrent toolchain evaluation
//!
//! Many toolchains declare and resolve arguments on separate threads; the
//! results must not depend on which thread ran first.

use std::sync::Arc;
use std::thread;

use build_args::{Args, HostInfo, KeyValueMap, MemoryScope, Origin, Scope, ToolchainId, Value};

const TOOLCHAINS: usize = 16;

fn shared_declarations() -> KeyValueMap {
    let origin = Origin::at("//build/config/BUILDCONFIG.gn", 12);
    ["is_debug", "is_component_build", "symbol_level", "use_lld"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            (
                name.to_string(),
                Value::integer(i as i64).with_origin(origin.clone()),
            )
        })
        .collect()
}

fn toolchain_id(i: usize) -> ToolchainId {
    if i == TOOLCHAINS - 1 {
        ToolchainId::default_toolchain(format!("//tc:{:02}", i))
    } else {
        ToolchainId::new(format!("//tc:{:02}", i))
    }
}

/// Evaluate every toolchain on its own thread, in the given spawn order.
fn run(order: &[usize]) -> Arc<Args> {
    let args = Arc::new(Args::new(HostInfo::new("linux", "x64")));
    args.add_arg_override("symbol_level", Value::integer(0));
    args.add_arg_override("use_lldd", Value::boolean(true));

    let handles: Vec<_> = order
        .iter()
        .map(|&i| {
            let args = Arc::clone(&args);
            thread::spawn(move || {
                let mut scope = MemoryScope::new(toolchain_id(i));
                let mut toolchain_args = KeyValueMap::new();
                toolchain_args.insert("current_cpu".to_string(), Value::string(format!("cpu{}", i)));
                args.setup_root_scope(&mut scope, &toolchain_args);

                let mut own = KeyValueMap::new();
                own.insert(
                    format!("only_in_{:02}", i),
                    Value::boolean(true).with_origin(Origin::at(format!("//tc{}.gni", i), 1)),
                );
                args.declare_args(&shared_declarations(), &mut scope)
                    .expect("shared declarations share an origin");
                args.declare_args(&own, &mut scope).expect("unique name");

                assert_eq!(scope.get_value("symbol_level"), Some(&Value::integer(0)));
                assert_eq!(
                    scope.get_value("current_cpu"),
                    Some(&Value::string(format!("cpu{}", i)))
                );
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }
    args
}

#[test]
fn test_results_independent_of_thread_order() {
    let forward: Vec<usize> = (0..TOOLCHAINS).collect();
    let reverse: Vec<usize> = (0..TOOLCHAINS).rev().collect();

    let a = run(&forward);
    let b = run(&reverse);

    assert_eq!(a.get_all_arguments(), b.get_all_arguments());
    assert_eq!(a.toolchains(), b.toolchains());
    assert_eq!(
        a.verify_all_overrides_used().unwrap_err(),
        b.verify_all_overrides_used().unwrap_err()
    );
}

#[test]
fn test_default_toolchain_enumerated_first() {
    let order: Vec<usize> = (0..TOOLCHAINS).collect();
    let args = run(&order);

    let toolchains = args.toolchains();
    assert_eq!(toolchains.len(), TOOLCHAINS);
    assert!(toolchains[0].is_default);
    assert!(toolchains[1..].windows(2).all(|w| w[0].label < w[1].label));
}

#[test]
fn test_unused_override_suggestion_under_concurrency() {
    let order: Vec<usize> = (0..TOOLCHAINS).collect();
    let args = run(&order);

    let err = args.verify_all_overrides_used().unwrap_err();
    assert_eq!(err.name(), Some("use_lldd"));
    assert!(err.help().starts_with("Did you mean \"use_lld\"?"));
}

#[test]
fn test_all_toolchain_declarations_listed() {
    let order: Vec<usize> = (0..TOOLCHAINS).collect();
    let args = run(&order);

    let all = args.get_all_arguments();
    for i in 0..TOOLCHAINS {
        assert!(all.contains_key(&format!("only_in_{:02}", i)));
    }
    assert!(all["symbol_level"].has_override);
    assert_eq!(all["symbol_level"].current_value(), &Value::integer(0));
}
