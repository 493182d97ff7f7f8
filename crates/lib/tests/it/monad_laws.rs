//! Property 2: the monad laws the query algebra is built on (`Bind`/`Return`
//! left identity, right identity, and associativity).

use minidb::{Bindings, Expr, Fuel, Query, QueryFunc, Value, interp};

fn run(query: &Query) -> Vec<Value> {
    let fuel = Fuel::new(10_000);
    interp::execute(query, &fuel, Bindings::empty())
        .map(|item| item.map(|(_, v)| v))
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn left_identity_bind_return_v_f_equals_f_applied_to_v() {
    let left = Query::bind(
        Query::ret(Expr::constant(7i64)),
        QueryFunc::new(Some("x"), Query::ret(Expr::op("add", vec![Expr::var("x"), Expr::constant(1i64)]).unwrap())),
    );
    let right = Query::ret(Expr::op("add", vec![Expr::constant(7i64), Expr::constant(1i64)]).unwrap());
    assert_eq!(run(&left), run(&right));
}

#[test]
fn right_identity_bind_q_return_var_equals_q() {
    let q = Query::union(vec![Query::ret(Expr::constant(1i64)), Query::ret(Expr::constant(2i64))]);
    let lifted = Query::bind(q.clone(), QueryFunc::new(Some("x"), Query::ret(Expr::var("x"))));
    assert_eq!(run(&lifted), run(&q));
}

#[test]
fn associativity_of_nested_binds() {
    let q = Query::union(vec![Query::ret(Expr::constant(1i64)), Query::ret(Expr::constant(2i64))]);
    let f = |var: &str| QueryFunc::new(Some(var.to_string()), Query::ret(Expr::op("add", vec![Expr::var(var), Expr::constant(10i64)]).unwrap()));
    let g = |var: &str| QueryFunc::new(Some(var.to_string()), Query::ret(Expr::op("mul", vec![Expr::var(var), Expr::constant(2i64)]).unwrap()));

    // Bind(Bind(q, f), g)
    let left = Query::bind(Query::bind(q.clone(), f("x")), g("y"));

    // Bind(q, Func(x, Bind(f(x), g)))
    let right = Query::bind(
        q,
        QueryFunc::new(
            Some("x"),
            Query::bind(Query::ret(Expr::op("add", vec![Expr::var("x"), Expr::constant(10i64)]).unwrap()), g("y")),
        ),
    );

    assert_eq!(run(&left), run(&right));
}
