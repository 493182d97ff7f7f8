//! Scenario S2 (remove-by-query) and properties 3/4/8 (remove ⊆ select,
//! idempotence on a stable query, descending-order array deletion).

use minidb::{Error, Expr, PathBuf, Query, QueryFunc, Value};

use crate::helpers::{seed_users, temp_store};

#[test]
fn remove_deletes_every_selected_result() {
    let (_dir, store) = temp_store();
    seed_users(&store);

    let qf = QueryFunc::new(Some("root"), Query::get(Expr::var("root"), PathBuf::root().push("users")));
    let before = store.select(&qf, None).unwrap();
    assert_eq!(before.len(), 2);

    store.remove(&qf, None).unwrap();

    let after = store.select(&qf, None).unwrap();
    assert_eq!(after.len(), 0, "remove must be idempotent on a stable query (property 4)");
}

#[test]
fn remove_requires_tree_sourced_results() {
    let (_dir, store) = temp_store();
    seed_users(&store);

    // A synthesized constant has no originating path.
    let qf = QueryFunc::new(None::<String>, Query::ret(Expr::constant(1i64)));
    let err = store.remove(&qf, None).unwrap_err();
    assert!(matches!(err, Error::RemovalOfNonTreeValue));
}

#[test]
fn remove_deletes_array_indices_in_descending_order_through_the_store() {
    let (_dir, store) = temp_store();
    store
        .insert(&PathBuf::root().push("letters"), serde_json::from_str(r#"["a","b","c","d","e"]"#).unwrap(), false, false)
        .unwrap();

    let qf = QueryFunc::new(
        Some("root"),
        Query::union(vec![
            Query::ret(Expr::get(Expr::var("root"), PathBuf::root().push("letters").push(1usize))),
            Query::ret(Expr::get(Expr::var("root"), PathBuf::root().push("letters").push(3usize))),
        ]),
    );
    store.remove(&qf, None).unwrap();

    let select_qf = QueryFunc::new(Some("root"), Query::get(Expr::var("root"), PathBuf::root().push("letters")));
    let remaining = store.select(&select_qf, None).unwrap();
    assert_eq!(
        remaining,
        vec![Value::Array(vec![Value::Str("a".into()), Value::Str("c".into()), Value::Str("e".into())])]
    );
}
