use rotor_frames::frames::{self, FrameOptions};
use rotor_frames::{continuity, differentiation, Quaternion, QuaternionInterpolator};
use tracing_subscriber::EnvFilter;

// The orbital angular momentum of a precessing binary, sampled on an uneven grid: it cones around
// the z axis while the cone slowly opens up.
fn angular_momentum(t: f64) -> Quaternion {
    let opening = 0.2 + 0.01 * t;
    let phase = 0.3 * t + 0.002 * t * t;
    Quaternion::pure(
        opening.sin() * phase.cos(),
        opening.sin() * phase.sin(),
        opening.cos(),
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let times: Vec<f64> = (0..400).map(|i| f64::from(i).powf(1.2) * 0.05).collect();
    let directions: Vec<_> = times.iter().copied().map(angular_momentum).collect();

    let options = FrameOptions::default().with_iterations(8);
    let frame = frames::frame_from_z_with(&directions, &times, &options)?;

    // the frame's own z axis must track the angular momentum
    let worst = frame
        .iter()
        .zip(&directions)
        .map(|(r, z)| (r.rotate(&Quaternion::Z) - *z).abs())
        .fold(0., f64::max);
    println!("largest deviation of frame z from L: {worst:e}");

    // and it must not spin about that axis
    let rdot = differentiation::centered_differencing(&frame, &times)?;
    let twist = frame
        .iter()
        .zip(&rdot)
        .map(|(r, rdot)| (r.conjugate() * *rdot * Quaternion::Z).w().abs())
        .fold(0., f64::max);
    println!("largest residual twist rate: {twist:e}");

    // a second frame that lags the first by a constant rotation
    let lag = Quaternion::from_axis_angle(
        uom::si::f64::Angle::new::<uom::si::angle::degree>(10.),
        &nalgebra::Vector3::x(),
    );
    let lagged: Vec<_> = continuity::unflip_rotors(
        &frame.iter().map(|r| *r * lag).collect::<Vec<_>>(),
        continuity::DEFAULT_DISCONTINUITY,
    );
    let delta = frames::r_delta(&frame, &lagged, 0)?;
    println!("relative rotation at the end: {}", delta[delta.len() - 1]);

    let mut interpolator = QuaternionInterpolator::new(&times, &frame)?;
    let last = times[times.len() - 1];
    for step in 0..=10 {
        let t = last * f64::from(step) / 10.;
        let r = interpolator.interpolate(t)?;
        println!("t = {t:8.3}  R = {r}");
    }

    Ok(())
}
