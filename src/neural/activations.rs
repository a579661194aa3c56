/// Logistic transfer function, `1 / (1 + e^-x)`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Derivative of the sigmoid with respect to its input, expressed in terms of
/// the already-activated value `a_x = sigmoid(x)`: `a_x * (1 - a_x)`.
/// This way the pre-activation sum never has to be kept around.
pub fn sigmoid_derivative(a_x: f64) -> f64 {
    a_x * (1.0 - a_x)
}
