use calcexpr_rs::{EvaluationSettings, Evaluator, Expression, Variable};
use log::debug;

fn main() {
    pretty_env_logger::init();

    let expression = Expression::parse("sqrt(x^2 + y^2)").unwrap();
    debug!("Parsed: {}", expression);

    let bindings: Vec<Vec<Variable>> = (0..10)
        .map(|i| {
            vec![
                Variable::new("x", i as f64),
                Variable::new("y", (i * 2) as f64),
            ]
        })
        .collect();

    let settings = EvaluationSettings::default();
    let evaluator = Evaluator::with_builtins(&settings);
    let results = expression.evaluate_batch(&bindings, &evaluator);

    for (i, result) in results.iter().enumerate() {
        println!("Result {}: {:?}", i, result);
    }
}
