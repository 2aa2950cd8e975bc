/// `num_values` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, num_values: usize) -> Vec<f64> {
    if num_values == 1 {
        return vec![start];
    }
    let mut values = Vec::with_capacity(num_values);
    let step = (end - start) / (num_values as f64 - 1.0);

    for i in 0..num_values {
        let value = start + (i as f64 * step);
        values.push(value);
    }

    values
}

/*
    let f = |x: f64| -> Result<f64, ()> { Ok(x * x) };
    let d = central_difference(&f, 3.0, 1e-6); // ~ 6.0
*/
/// Central finite difference `(f(x+h) - f(x-h)) / 2h` for a fallible function;
/// the first failing neighbour evaluation is returned as is.
pub fn central_difference<F, E>(f: F, x: f64, h: f64) -> Result<f64, E>
where
    F: Fn(f64) -> Result<f64, E>,
{
    let f_x_plus_h = f(x + h)?;
    let f_x_minus_h = f(x - h)?;
    Ok((f_x_plus_h - f_x_minus_h) / (2.0 * h))
}

pub fn numerical_derivative<F, E>(f: F, x_values: &[f64], h: f64) -> Result<Vec<f64>, E>
where
    F: Fn(f64) -> Result<f64, E>,
{
    let mut derivatives = Vec::with_capacity(x_values.len());

    for &x in x_values {
        derivatives.push(central_difference(&f, x, h)?);
    }

    Ok(derivatives)
}

// compute norm of two vectors
pub fn norm(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len());
    if x.is_empty() {
        return 0.0;
    }
    (1.0 / x.len() as f64)
        * x.iter()
            .zip(y.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linspace() {
        let points = linspace(0.0, 1.0, 5);
        assert_eq!(points, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
    }

    #[test]
    fn test_central_difference() {
        let f = |x: f64| -> Result<f64, ()> { Ok(x * x * x) };
        let d = central_difference(f, 2.0, 1e-5).unwrap();
        assert_relative_eq!(d, 12.0, epsilon = 1e-6);
    }

    #[test]
    fn test_central_difference_propagates_error() {
        let f = |x: f64| -> Result<f64, &'static str> {
            if x > 1.0 { Err("out of range") } else { Ok(x) }
        };
        assert_eq!(central_difference(f, 1.0, 0.1), Err("out of range"));
    }

    #[test]
    fn test_norm() {
        assert_eq!(norm(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
        assert_relative_eq!(norm(&[3.0], &[0.0]), 3.0);
    }
}
