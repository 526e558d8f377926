use crate::errors::OdeError;
use crate::numerical::error_estimation::ErrorEstimate;
use plotters::prelude::*;
use std::path::Path;

/// axis range with a margin, never empty
pub fn padded_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (-1.0, 1.0);
    }
    let span = max - min;
    let pad = if span > 0.0 {
        0.05 * span
    } else {
        (0.05 * max.abs()).max(1e-12)
    };
    (min - pad, max + pad)
}

fn draw_line_chart(
    filename: &Path,
    caption: &str,
    x_desc: &str,
    y_desc: &str,
    x: &[f64],
    y: &[f64],
) -> Result<(), Box<dyn std::error::Error>> {
    let (x_min, x_max) = padded_range(x);
    let (y_min, y_max) = padded_range(y);
    let root_area = BitMapBackend::new(filename, (800, 600)).into_drawing_area();
    root_area.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root_area)
        .caption(caption, ("sans-serif", 40))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;

    let series: Vec<(f64, f64)> = x.iter().cloned().zip(y.iter().cloned()).collect();
    chart
        .draw_series(LineSeries::new(series.clone(), &Palette99::pick(0)))?
        .label(y_desc.to_string())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], Palette99::pick(0)));
    chart.draw_series(
        series
            .iter()
            .map(|&point| Circle::new(point, 3, Palette99::pick(0).filled())),
    )?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root_area.present()?;
    Ok(())
}

/// Draws the solution into `{dir}/{function}.png` and its error estimate into
/// `{dir}/{function}_error.png`.
pub fn plot_estimate(
    estimate: &ErrorEstimate,
    arg: &str,
    function: &str,
    dir: &str,
) -> Result<(), OdeError> {
    let dir = Path::new(dir);
    let x = estimate.x.as_slice();
    draw_line_chart(
        &dir.join(format!("{}.png", function)),
        &format!("RK4 solution {}({})", function, arg),
        arg,
        function,
        x,
        estimate.y.as_slice(),
    )
    .map_err(|e| OdeError::Io(format!("plotting of {} failed: {}", function, e)))?;
    draw_line_chart(
        &dir.join(format!("{}_error.png", function)),
        &format!("Richardson error estimate of {}", function),
        arg,
        "error",
        x,
        estimate.error.as_slice(),
    )
    .map_err(|e| OdeError::Io(format!("plotting of the error of {} failed: {}", function, e)))?;
    Ok(())
}
