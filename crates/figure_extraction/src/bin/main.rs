//cargo run --package figure_extraction --bin figure_extraction
use std::sync::Arc;

use figure_extraction::{
    FigureExtractor, FilterConfiguration, FilterOptions, ImageDimensions, KernelShape, RecordingDiagnostics,
};
use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_filled_rect_mut, rect::Rect};
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .finish()
        .init();

    tracing::info!("Figure extraction demo");

    let page = create_test_page();

    demo_default_extractor(&page)?;
    demo_options(&page)?;
    demo_diagnostics(&page)?;

    Ok(())
}

fn demo_default_extractor(page: &RgbImage) -> color_eyre::Result<()> {
    let config = FilterConfiguration::new(KernelShape::Rectangle, KernelShape::Rectangle);
    let extractor = FigureExtractor::new(config);
    tracing::info!("{}", extractor.info());

    for region in extractor.find_figures(page)? {
        let region = region?;
        tracing::info!(
            contour = region.contour_index(),
            points = region.polygon().map_or(0, |p| p.len()),
            "figure {}",
            region
        );
    }

    Ok(())
}

fn demo_options(page: &RgbImage) -> color_eyre::Result<()> {
    tracing::info!(
        "Option schema: {}",
        serde_json::to_string(&FilterOptions::schema())?
    );

    let options = FilterOptions::from_json(
        r#"{"erosion_element": "ellipse", "dilation_element": "cross", "dilation_size": 8, "canny_threshold": 40}"#,
    )?;
    let extractor = FigureExtractor::from_options(options)?;

    let count = extractor.find_figures(page)?.filter(|r| r.is_ok()).count();
    tracing::info!(count, "figures with edge detection enabled");

    match FilterOptions::from_json(r#"{"erosion_element": "star", "dilation_element": "cross"}"#)
        .and_then(FigureExtractor::from_options)
    {
        Ok(_) => tracing::warn!("unknown shape was accepted"),
        Err(err) => tracing::info!("rejected options: {}", err),
    }

    Ok(())
}

fn demo_diagnostics(page: &RgbImage) -> color_eyre::Result<()> {
    let sink = Arc::new(RecordingDiagnostics::new());
    let config = FilterConfiguration::builder(KernelShape::Cross, KernelShape::Rectangle)
        .min_area(0.005)
        .width_range(0.05, 0.95)
        .build()?;
    let extractor = FigureExtractor::builder(config)
        .with_diagnostics(sink.clone())
        .build();

    let thresholds = extractor.thresholds(ImageDimensions::from(page));
    tracing::info!(?thresholds, "page thresholds");

    let accepted = extractor.find_figures(page)?.filter(|r| r.is_ok()).count();
    for rejection in sink.rejections() {
        tracing::info!(contour = rejection.contour_index, "{}", rejection.reason);
    }
    tracing::info!(accepted, rejected = sink.rejections().len(), "done");

    Ok(())
}

/// A page with two figures, a few text-like lines and some specks
fn create_test_page() -> RgbImage {
    let mut page = RgbImage::from_pixel(850, 1100, Rgb([255, 255, 255]));
    let ink = Rgb([20, 20, 20]);

    draw_filled_rect_mut(&mut page, Rect::at(100, 120).of_size(420, 300), ink);
    draw_filled_rect_mut(&mut page, Rect::at(150, 170).of_size(200, 150), Rgb([250, 250, 250]));
    draw_filled_rect_mut(&mut page, Rect::at(480, 650).of_size(280, 260), Rgb([90, 60, 40]));

    for line in 0..6 {
        draw_filled_rect_mut(&mut page, Rect::at(80, 460 + line * 24).of_size(680, 10), ink);
    }
    for speck in 0..5 {
        draw_filled_rect_mut(&mut page, Rect::at(60 + speck * 150, 1000).of_size(3, 3), ink);
    }

    page
}
