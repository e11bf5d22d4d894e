use glam::Vec2;
use tch::Tensor;

use crate::error::{Error, Result};
use crate::waypoint::Waypoint;

pub trait ToTensor {
    fn to_tensor(&self) -> Tensor;
}

impl ToTensor for [f32] {
    fn to_tensor(&self) -> Tensor {
        Tensor::from_slice(self).unsqueeze(0)
    }
}

impl ToTensor for Vec<f32> {
    fn to_tensor(&self) -> Tensor {
        self.as_slice().to_tensor()
    }
}

/// Draws the driven path over the reference waypoints.
pub fn plot_trajectory(
    waypoints: &[Waypoint],
    trajectory: &[Vec2],
    filename: &str,
    title: &str,
) -> Result<()> {
    use plotters::prelude::*;

    let plot_err = |e: &dyn std::fmt::Display| Error::Plot(e.to_string());

    let points = waypoints
        .iter()
        .map(Waypoint::planar)
        .chain(trajectory.iter().copied());
    let (min, max) = points.fold(
        (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
        |(lo, hi), p| (lo.min(p), hi.max(p)),
    );
    if min.x > max.x {
        return Err(Error::Plot("nothing to plot".into()));
    }
    // margin, also keeps degenerate (straight-line) tracks drawable
    let margin = ((max - min).max_element() * 0.05).max(1.0);

    let root = BitMapBackend::new(filename, (800, 800)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_err(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(min.x - margin..max.x + margin, min.y - margin..max.y + margin)
        .map_err(|e| plot_err(&e))?;

    chart
        .configure_mesh()
        .x_desc("x (m)")
        .y_desc("y (m)")
        .light_line_style(&WHITE.mix(0.3))
        .draw()
        .map_err(|e| plot_err(&e))?;

    chart
        .draw_series(
            waypoints
                .iter()
                .map(|w| Circle::new((w.location.x, w.location.y), 2, BLUE.filled())),
        )
        .map_err(|e| plot_err(&e))?
        .label("Waypoints")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, BLUE.filled()));

    chart
        .draw_series(LineSeries::new(
            trajectory.iter().map(|p| (p.x, p.y)),
            &RED,
        ))
        .map_err(|e| plot_err(&e))?
        .label("Vehicle")
        .legend(|(x, y)| PathElement::new([(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| plot_err(&e))?;

    root.present().map_err(|e| plot_err(&e))?;
    tracing::info!("Saved trajectory plot to {}", filename);
    Ok(())
}
