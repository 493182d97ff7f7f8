//! Scenarios S3/S4/S5 (update-increment, update-rename-key, update-append)
//! and S6 (rollback on a faulting apply).

use minidb::{Change, Error, Expr, PathBuf, Query, QueryFunc, UpdateMode, Value, ValueFunc};

use crate::helpers::temp_store;

#[test]
fn update_overwrite_increments_every_matched_value() {
    let (_dir, store) = temp_store();
    store.insert(&PathBuf::root().push("hits"), Value::Int(1), false, false).unwrap();

    let qf = QueryFunc::new(Some("root"), Query::ret(Expr::get(Expr::var("root"), PathBuf::root().push("hits"))));
    let change = Change {
        subpath: PathBuf::root(),
        valuefunc: ValueFunc::new(Some("v"), Expr::op("add", vec![Expr::var("v"), Expr::constant(1i64)]).unwrap()),
        mode: UpdateMode::Overwrite,
    };
    store.update(&qf, &[change], None).unwrap();

    let select_qf = QueryFunc::new(Some("root"), Query::ret(Expr::get(Expr::var("root"), PathBuf::root().push("hits"))));
    assert_eq!(store.select(&select_qf, None).unwrap(), vec![Value::Int(2)]);
}

#[test]
fn update_renamekey_moves_a_field_to_a_new_name() {
    let (_dir, store) = temp_store();
    store.insert(&PathBuf::root().push("old_name"), Value::Str("x".into()), false, false).unwrap();

    let qf = QueryFunc::new(Some("root"), Query::get(Expr::var("root"), PathBuf::root()));
    let change = Change {
        subpath: PathBuf::root().push("old_name"),
        valuefunc: ValueFunc::new(None::<String>, Expr::constant("new_name")),
        mode: UpdateMode::Renamekey,
    };
    store.update(&qf, &[change], None).unwrap();

    let root_qf = QueryFunc::new(Some("root"), Query::get(Expr::var("root"), PathBuf::root()));
    let remaining_keys: Vec<_> = store.select(&root_qf, None).unwrap();
    assert_eq!(remaining_keys, vec![Value::Str("x".into())]);

    let old_qf = QueryFunc::new(Some("root"), Query::get(Expr::var("root"), PathBuf::root().push("old_name")));
    assert!(store.select(&old_qf, None).is_err());
}

#[test]
fn update_append_pushes_onto_a_nested_array() {
    let (_dir, store) = temp_store();
    store.insert(&PathBuf::root().push("log"), Value::Array(vec![]), false, false).unwrap();

    let qf = QueryFunc::new(Some("root"), Query::get(Expr::var("root"), PathBuf::root()));
    let change = Change {
        subpath: PathBuf::root().push("log"),
        valuefunc: ValueFunc::new(None::<String>, Expr::constant("entry")),
        mode: UpdateMode::Append,
    };
    store.update(&qf, &[change], None).unwrap();

    let log_qf = QueryFunc::new(Some("root"), Query::get(Expr::var("root"), PathBuf::root().push("log")));
    assert_eq!(store.select(&log_qf, None).unwrap(), vec![Value::Str("entry".into())]);
}

/// Two changes applied to the same result: the first mutates the tree
/// in-place, the second hits a `Renamekey` whose target isn't a map (an
/// array element addressed by position), raising `InconsistentData`. The
/// store must roll the first change back too rather than leave it applied.
#[test]
fn a_faulting_apply_rolls_back_the_whole_update() {
    let (_dir, store) = temp_store();
    store.insert(&PathBuf::root().push("counter"), Value::Int(1), false, false).unwrap();
    store.insert(&PathBuf::root().push("items"), Value::Array(vec![Value::Int(1), Value::Int(2)]), false, false).unwrap();
    store.commit().unwrap();

    // A single result standing for the whole document, so both changes'
    // subpaths are relative to the tree root.
    let qf = QueryFunc::new(Some("root"), Query::ret(Expr::var("root")));
    let bump_counter = Change {
        subpath: PathBuf::root().push("counter"),
        valuefunc: ValueFunc::new(None::<String>, Expr::constant(2i64)),
        mode: UpdateMode::Overwrite,
    };
    let bad_rename = Change {
        subpath: PathBuf::root().push("items").push(0usize),
        valuefunc: ValueFunc::new(None::<String>, Expr::constant("renamed")),
        mode: UpdateMode::Renamekey,
    };

    let err = store.update(&qf, &[bump_counter, bad_rename], None).unwrap_err();
    assert!(matches!(err, Error::InconsistentData { .. }));

    let counter_qf = QueryFunc::new(Some("root"), Query::ret(Expr::get(Expr::var("root"), PathBuf::root().push("counter"))));
    assert_eq!(
        store.select(&counter_qf, None).unwrap(),
        vec![Value::Int(1)],
        "the in-memory tree must be rolled back to the last commit, undoing the counter bump too"
    );
}
