extern crate multipoly;

use multipoly::Polynomial;

fn main() {

    // measured detector response: counts vs exposure time in seconds
    let exposure = [0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0];
    let counts = [
        258.1, 514.5, 770.4, 1028.0, 1285.3, 1544.1, 1802.5, 2062.4,
    ];

    let response = Polynomial::fit_1d(&exposure, &counts, 0, 2, None).unwrap();

    println!("{}", response);

    let residuals = response.residuals(&[&exposure], &counts).unwrap();

    println!("exposure;measured;fitted;residual");
    for i in 0..exposure.len() {
        let fitted = response.eval_1d(exposure[i]).unwrap();
        println!(
            "{:.1};{:.1};{:.2};{:.3}",
            exposure[i], counts[i], fitted, residuals[i]
        );
    }
}
