//! Property 7: any query with unbounded expansion terminates with
//! `OutOfFuel` within the configured budget, exercised end-to-end through a
//! `Store` rather than the bare interpreter.

use minidb::{Error, Expr, PathBuf, Query, QueryFunc, Store, StoreConfig};

#[test]
fn a_store_with_a_tiny_fuel_budget_aborts_a_large_cross_product() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path().join("db.json")).with_fuel_budget(5);
    let store = Store::open(config).unwrap();
    store
        .insert(&PathBuf::root().push("xs"), serde_json::from_str("[0,1,2,3,4,5,6,7,8,9]").unwrap(), false, false)
        .unwrap();

    // Nested binds over the same ten-element array: 10^3 = 1000 combinations,
    // ticking fuel on every inner iteration, far outpacing a budget of 5.
    let inner = Query::get(Expr::var("root"), PathBuf::root().push("xs"));
    let nested = Query::bind(
        inner.clone(),
        QueryFunc::new(
            Some("a"),
            Query::bind(inner.clone(), QueryFunc::new(Some("b"), Query::bind(inner, QueryFunc::new(Some("c"), Query::ret(Expr::var("c")))))),
        ),
    );

    let qf = QueryFunc::new(Some("root"), nested);
    let err = store.select(&qf, None).unwrap_err();
    assert!(matches!(err, Error::OutOfFuel));
}
