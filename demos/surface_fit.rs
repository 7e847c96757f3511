extern crate multipoly;

use multipoly::{flops, Polynomial};

fn main() {

    // synthetic flat-field illumination over a 6x6 pixel grid
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut intensity = Vec::new();
    for x in 0..6 {
        for y in 0..6 {
            let (xf, yf) = (x as f64, y as f64);
            xs.push(xf);
            ys.push(yf);
            intensity
                .push(1.0 + 0.04 * xf + 0.03 * yf - 0.002 * xf * yf + 0.0004 * xf * xf * yf);
        }
    }

    flops::reset();
    let surface = Polynomial::fit_2d(&xs, &ys, &intensity, false, 0, 2).unwrap();

    println!("{}", surface);

    let residuals = surface.residuals(&[&xs, &ys], &intensity).unwrap();
    let rms = (residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64).sqrt();

    println!("rms residual: {:.3e}", rms);
    println!("flops: {}", flops::count());
}
