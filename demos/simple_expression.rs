use calcexpr_rs::{Calculator, Variable};
use log::debug;

fn main() {
    pretty_env_logger::init();

    let result = calcexpr_rs::evaluate_expression("(5 + 2)(2(3 / 4) + 3 *.5)", &[]).unwrap();
    println!("Result: {}", result);

    let variables = [Variable::new("x", 3.0)];
    let result = calcexpr_rs::evaluate_expression("2x^2 - 4x + 1", &variables).unwrap();
    println!("Result with x = 3: {}", result);

    let mut calculator = Calculator::default();
    calculator.set_variable("r", 2.0).unwrap();
    calculator.set_expression("area", "pi*r^2").unwrap();
    calculator.set_expression("hyp", "sqrt(a^2+b^2)").unwrap();

    for text in ["area(r)", "hyp(3, 4)", "sum(k!, k, 0, 5)", "1/0"] {
        match calculator.calculate(text) {
            Ok(result) => println!("{} = {}", text, result),
            Err(err) => println!("{}: {}", text, err),
        }
    }
    debug!("Cached parses: {}", calculator.cached_len());
}
