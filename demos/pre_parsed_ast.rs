use calcexpr_rs::{ASTNode, AngleUnit, EvaluationSettings, Expression, Variable};

fn main() {
    pretty_env_logger::init();

    let expression = Expression::parse("sin(t) * amplitude").expect("Failed to parse");
    println!("Parsed: {}", expression);
    println!("Depends on: {:?}", expression.depends_on_variables());

    let settings = EvaluationSettings::default().with_angle_unit(AngleUnit::Degrees);
    for degrees in [0.0, 30.0, 90.0] {
        let variables = [
            Variable::new("t", degrees),
            Variable::new("amplitude", 2.0),
        ];
        match expression.evaluate(&variables, &settings) {
            Ok(result) => println!("t = {}: {}", degrees, result),
            Err(err) => println!("Error: {}", err),
        }
    }

    // trees can also be built by hand
    let tree = ASTNode::Factorial(Box::new(ASTNode::Number(5.0)));
    let built = Expression::from_ast(tree);
    println!("{} = {:?}", built, built.evaluate(&[], &settings));
}
