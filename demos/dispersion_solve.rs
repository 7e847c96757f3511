extern crate multipoly;

use multipoly::Polynomial;

fn main() {

    // calibration samples: wavelength in Angstrom per detector pixel
    let pixels: Vec<f64> = (0..=20).map(|i| 5.0 * i as f64).collect();
    let wavelengths: Vec<f64> = pixels
        .iter()
        .map(|p| 3500.0 + 2.0 * p + 0.002 * p * p - 5.0e-6 * p * p * p)
        .collect();

    let dispersion = Polynomial::fit_1d(&pixels, &wavelengths, 0, 3, None).unwrap();

    println!("{}", dispersion);

    // locate the pixel observing the 3600 Angstrom line
    let target = 3600.0;
    let mut offset = dispersion.clone();
    let constant = offset.get_coeff(&[0]).unwrap();
    offset.set_coeff(&[0], constant - target).unwrap();

    let pixel = offset.solve_1d_monotonic(50.0, 1).unwrap();
    let (value, slope) = dispersion.eval_1d_with_derivative(pixel).unwrap();

    println!("{} Angstrom falls on pixel {:.3}", target, pixel);
    println!("local dispersion: {:.4} Angstrom/pixel", slope);
    println!("wavelength there: {:.6}", value);
}
