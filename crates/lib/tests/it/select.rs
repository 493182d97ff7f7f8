//! Scenario S1 (select-with-require) and property 1 (select purity).

use minidb::{Expr, PathBuf, Query, QueryFunc};

use crate::helpers::{seed_users, temp_store};

#[test]
fn select_with_require_filters_by_predicate() {
    let (_dir, store) = temp_store();
    seed_users(&store);

    // for u in users: require(u.age > 26); return u.name
    let query = Query::bind(
        Query::get(Expr::var("root"), PathBuf::root().push("users")),
        QueryFunc::new(
            Some("u"),
            Query::bind(
                Query::require(Expr::op("gt", vec![Expr::get(Expr::var("u"), PathBuf::root().push("age")), Expr::constant(26i64)]).unwrap()),
                QueryFunc::new(None::<String>, Query::ret(Expr::get(Expr::var("u"), PathBuf::root().push("name")))),
            ),
        ),
    );

    let results = store.select(&QueryFunc::new(Some("root"), query), None).unwrap();
    assert_eq!(results, vec![minidb::Value::Str("kmill".into())]);
}

#[test]
fn select_is_pure_and_repeatable() {
    let (_dir, store) = temp_store();
    seed_users(&store);

    let qf = QueryFunc::new(Some("root"), Query::get(Expr::var("root"), PathBuf::root().push("users")));
    let first = store.select(&qf, None).unwrap();
    let second = store.select(&qf, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn narrowing_by_subpath_scopes_the_query_root() {
    let (_dir, store) = temp_store();
    seed_users(&store);

    let qf = QueryFunc::new(Some("root"), Query::get(Expr::var("root"), PathBuf::root()));
    let results = store.select(&qf, Some(&PathBuf::root().push("users").push(0usize))).unwrap();
    assert_eq!(results.len(), 2); // name, age
}
