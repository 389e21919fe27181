use mechanics::{FrictionModel, TurnKinematics};
use plotters::prelude::*;
use simcore::{GravityPreset, VehicleParams};

fn draw_series(
    filename: &str,
    title: &str,
    x_label: &str,
    y_label: &str,
    series: &[(&str, RGBColor, Vec<(f64, f64)>)],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(filename, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let points = series.iter().flat_map(|(_, _, pts)| pts.iter());
    let (x_max, y_max) = points.fold((0.0f64, 0.0f64), |(xm, ym), &(x, y)| (xm.max(x), ym.max(y)));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("Arial", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

    chart.configure_mesh().x_desc(x_label).y_desc(y_label).draw()?;

    for (label, color, pts) in series {
        let color = *color;
        chart
            .draw_series(LineSeries::new(pts.iter().cloned(), &color))?
            .label(*label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));
    }

    // Slip threshold
    chart.draw_series(LineSeries::new(vec![(0.0, 100.0), (x_max, 100.0)], &BLACK))?;

    chart.configure_series_labels().border_style(&BLACK).draw()?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let steering = 10f64.to_radians();
    let colors = [RED, BLUE, GREEN];

    let mut series = Vec::new();
    for (preset, color) in GravityPreset::ALL.into_iter().zip(colors) {
        let params = VehicleParams::new(500.0, preset.acceleration(), 0.7);
        let friction = FrictionModel::from_params(&params);

        // Speed sweep 0..15 m/s
        let pts: Vec<(f64, f64)> = (0..=150)
            .map(|i| {
                let v = i as f64 * 0.1;
                let kin = TurnKinematics::compute(&params, steering, v);
                (v, friction.utilization(kin.centripetal_force))
            })
            .collect();
        series.push((preset.name(), color, pts));
    }

    draw_series(
        "friction_utilization_vs_speed.png",
        "Friction Utilization vs Speed (10 deg steering)",
        "Speed [m/s]",
        "Utilization [%]",
        &series,
    )?;

    println!("Wrote plot: friction_utilization_vs_speed.png");

    Ok(())
}
