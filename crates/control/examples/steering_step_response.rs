use control::{PidController, PidLimits, PidPreset};
use std::fs::File;
use std::io::Write;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dt = 0.01;
    let t_end = 10.0;
    let target = 15f64.to_radians();
    let max_steer = 45f64.to_radians();

    let mut csv = File::create("steering_step_response.csv")?;
    writeln!(csv, "t,preset,steering_deg,rate_deg_s,integral")?;

    for preset in PidPreset::ALL {
        let mut pid = PidController::new(preset.gains(), PidLimits::default());
        let mut steering = 0.0_f64;
        let mut t = 0.0;

        while t <= t_end {
            // Steering actuator integrates the commanded rate
            let rate = pid.update(target, steering, dt);
            steering = (steering + rate * dt).clamp(-max_steer, max_steer);

            writeln!(
                csv,
                "{t:.3},{preset},{:.4},{:.4},{:.6}",
                steering.to_degrees(),
                rate.to_degrees(),
                pid.integral()
            )?;
            t += dt;
        }

        println!("{preset}: final steering {:.3} deg", steering.to_degrees());
    }

    println!("Wrote steering_step_response.csv");
    Ok(())
}
