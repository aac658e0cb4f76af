use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::error::{FigureError, Result};

pub const DEFAULT_EDGE_DETECTION_THRESHOLD: f32 = 0.0;
pub const DEFAULT_EROSION_SIZE: u32 = 4;
pub const DEFAULT_DILATION_SIZE: u32 = 4;
pub const DEFAULT_MIN_AREA: f64 = 0.01;
pub const DEFAULT_MIN_HEIGHT: f64 = 0.1;
pub const DEFAULT_MAX_HEIGHT: f64 = 0.9;
pub const DEFAULT_MIN_WIDTH: f64 = 0.1;
pub const DEFAULT_MAX_WIDTH: f64 = 0.9;

/// Structuring element shapes available for erosion and dilation
#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum KernelShape {
    /// Plus-shaped element: the anchor row and column
    Cross,
    /// Filled ellipse inscribed in the element box
    Ellipse,
    /// Fully filled box
    Rectangle,
}

impl KernelShape {
    /// Accepted shape names, sorted
    pub fn names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    /// Look a shape up by name, failing with `InvalidConfiguration` for unknown names
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse().map_err(|_| {
            FigureError::InvalidConfiguration(format!(
                "unknown kernel shape '{}', expected one of: {}",
                name,
                Self::names().join(", ")
            ))
        })
    }
}

/// Validated, read-only settings for one extraction run.
///
/// Size fractions are relative to the page: `min_area` to the total pixel
/// count, the height and width bounds to the page height and width.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct FilterConfiguration {
    edge_detection_threshold: f32,
    erosion_shape: KernelShape,
    erosion_size: u32,
    dilation_shape: KernelShape,
    dilation_size: u32,
    min_area: f64,
    min_height: f64,
    max_height: f64,
    min_width: f64,
    max_width: f64,
}

impl FilterConfiguration {
    /// Default settings with the given structuring element shapes
    pub fn new(erosion_shape: KernelShape, dilation_shape: KernelShape) -> Self {
        Self {
            edge_detection_threshold: DEFAULT_EDGE_DETECTION_THRESHOLD,
            erosion_shape,
            erosion_size: DEFAULT_EROSION_SIZE,
            dilation_shape,
            dilation_size: DEFAULT_DILATION_SIZE,
            min_area: DEFAULT_MIN_AREA,
            min_height: DEFAULT_MIN_HEIGHT,
            max_height: DEFAULT_MAX_HEIGHT,
            min_width: DEFAULT_MIN_WIDTH,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }

    pub fn builder(erosion_shape: KernelShape, dilation_shape: KernelShape) -> FilterConfigurationBuilder {
        FilterConfigurationBuilder {
            config: Self::new(erosion_shape, dilation_shape),
        }
    }

    /// Canny low threshold; 0 disables edge detection
    pub fn edge_detection_threshold(&self) -> f32 {
        self.edge_detection_threshold
    }

    pub fn erosion_shape(&self) -> KernelShape {
        self.erosion_shape
    }

    /// Element size in pixels; 0 disables erosion
    pub fn erosion_size(&self) -> u32 {
        self.erosion_size
    }

    pub fn dilation_shape(&self) -> KernelShape {
        self.dilation_shape
    }

    /// Element size in pixels; 0 disables dilation
    pub fn dilation_size(&self) -> u32 {
        self.dilation_size
    }

    pub fn min_area_fraction(&self) -> f64 {
        self.min_area
    }

    pub fn min_height_fraction(&self) -> f64 {
        self.min_height
    }

    pub fn max_height_fraction(&self) -> f64 {
        self.max_height
    }

    pub fn min_width_fraction(&self) -> f64 {
        self.min_width
    }

    pub fn max_width_fraction(&self) -> f64 {
        self.max_width
    }

    fn validate(&self) -> Result<()> {
        if !self.edge_detection_threshold.is_finite() || self.edge_detection_threshold < 0.0 {
            return Err(FigureError::InvalidConfiguration(format!(
                "edge_detection_threshold must be a finite value >= 0, got {}",
                self.edge_detection_threshold
            )));
        }

        let fractions = [
            ("min_area", self.min_area),
            ("min_height", self.min_height),
            ("max_height", self.max_height),
            ("min_width", self.min_width),
            ("max_width", self.max_width),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(FigureError::InvalidConfiguration(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.min_height > self.max_height {
            return Err(FigureError::InvalidConfiguration(format!(
                "min_height ({}) exceeds max_height ({})",
                self.min_height, self.max_height
            )));
        }
        if self.min_width > self.max_width {
            return Err(FigureError::InvalidConfiguration(format!(
                "min_width ({}) exceeds max_width ({})",
                self.min_width, self.max_width
            )));
        }

        Ok(())
    }
}

/// Fluent builder for [`FilterConfiguration`]; `build` validates
#[derive(Debug, Clone)]
pub struct FilterConfigurationBuilder {
    config: FilterConfiguration,
}

impl FilterConfigurationBuilder {
    pub fn edge_detection_threshold(mut self, threshold: f32) -> Self {
        self.config.edge_detection_threshold = threshold;
        self
    }

    pub fn erosion(mut self, shape: KernelShape, size: u32) -> Self {
        self.config.erosion_shape = shape;
        self.config.erosion_size = size;
        self
    }

    pub fn dilation(mut self, shape: KernelShape, size: u32) -> Self {
        self.config.dilation_shape = shape;
        self.config.dilation_size = size;
        self
    }

    pub fn min_area(mut self, fraction: f64) -> Self {
        self.config.min_area = fraction;
        self
    }

    pub fn height_range(mut self, min: f64, max: f64) -> Self {
        self.config.min_height = min;
        self.config.max_height = max;
        self
    }

    pub fn width_range(mut self, min: f64, max: f64) -> Self {
        self.config.min_width = min;
        self.config.max_width = max;
        self
    }

    pub fn build(self) -> Result<FilterConfiguration> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Caller-supplied option bag, e.g. parsed from a job description.
///
/// Shapes are plain names so that unknown values surface as
/// `InvalidConfiguration` rather than as a parse error. Both shapes are
/// required; every other field falls back to its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FilterOptions {
    pub canny_threshold: Option<f32>,
    pub erosion_element: Option<String>,
    pub erosion_size: Option<u32>,
    pub dilation_element: Option<String>,
    pub dilation_size: Option<u32>,
    #[schemars(range(min = 0.0, max = 1.0))]
    pub min_area: Option<f64>,
    #[schemars(range(min = 0.0, max = 1.0))]
    pub min_height: Option<f64>,
    #[schemars(range(min = 0.0, max = 1.0))]
    pub max_height: Option<f64>,
    #[schemars(range(min = 0.0, max = 1.0))]
    pub min_width: Option<f64>,
    #[schemars(range(min = 0.0, max = 1.0))]
    pub max_width: Option<f64>,
}

impl FilterOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// JSON schema describing the accepted options
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FilterOptions)
    }
}

fn required_shape(name: Option<&str>, field: &str) -> Result<KernelShape> {
    let name = name.ok_or_else(|| {
        FigureError::InvalidConfiguration(format!(
            "{} is required, expected one of: {}",
            field,
            KernelShape::names().join(", ")
        ))
    })?;
    KernelShape::from_name(name)
}

impl TryFrom<FilterOptions> for FilterConfiguration {
    type Error = FigureError;

    fn try_from(options: FilterOptions) -> Result<Self> {
        let erosion_shape = required_shape(options.erosion_element.as_deref(), "erosion_element")?;
        let dilation_shape = required_shape(options.dilation_element.as_deref(), "dilation_element")?;

        FilterConfiguration::builder(erosion_shape, dilation_shape)
            .edge_detection_threshold(options.canny_threshold.unwrap_or(DEFAULT_EDGE_DETECTION_THRESHOLD))
            .erosion(erosion_shape, options.erosion_size.unwrap_or(DEFAULT_EROSION_SIZE))
            .dilation(dilation_shape, options.dilation_size.unwrap_or(DEFAULT_DILATION_SIZE))
            .min_area(options.min_area.unwrap_or(DEFAULT_MIN_AREA))
            .height_range(
                options.min_height.unwrap_or(DEFAULT_MIN_HEIGHT),
                options.max_height.unwrap_or(DEFAULT_MAX_HEIGHT),
            )
            .width_range(
                options.min_width.unwrap_or(DEFAULT_MIN_WIDTH),
                options.max_width.unwrap_or(DEFAULT_MAX_WIDTH),
            )
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_names_are_sorted() {
        assert_eq!(KernelShape::names(), &["cross", "ellipse", "rectangle"]);
        assert_eq!(KernelShape::from_name("ellipse").unwrap(), KernelShape::Ellipse);
        assert_eq!(KernelShape::Rectangle.to_string(), "rectangle");
    }

    #[test]
    fn test_unknown_shape_is_invalid_configuration() {
        let err = KernelShape::from_name("diamond").unwrap_err();
        assert!(matches!(err, FigureError::InvalidConfiguration(_)));

        let options = FilterOptions {
            erosion_element: Some("diamond".to_string()),
            dilation_element: Some("cross".to_string()),
            ..Default::default()
        };
        let err = FilterConfiguration::try_from(options).unwrap_err();
        assert!(matches!(err, FigureError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_missing_shape_is_invalid_configuration() {
        let options = FilterOptions {
            dilation_element: Some("cross".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            FilterConfiguration::try_from(options),
            Err(FigureError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let config = FilterConfiguration::new(KernelShape::Cross, KernelShape::Ellipse);
        assert_eq!(config.edge_detection_threshold(), 0.0);
        assert_eq!(config.erosion_size(), 4);
        assert_eq!(config.dilation_size(), 4);
        assert_eq!(config.min_area_fraction(), 0.01);
        assert_eq!(config.min_height_fraction(), 0.1);
        assert_eq!(config.max_height_fraction(), 0.9);
        assert_eq!(config.min_width_fraction(), 0.1);
        assert_eq!(config.max_width_fraction(), 0.9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_out_of_range_values() {
        let base = || FilterConfiguration::builder(KernelShape::Rectangle, KernelShape::Rectangle);

        assert!(base().min_area(1.5).build().is_err());
        assert!(base().min_area(-0.1).build().is_err());
        assert!(base().height_range(0.5, 0.4).build().is_err());
        assert!(base().width_range(0.2, 1.1).build().is_err());
        assert!(base().edge_detection_threshold(-1.0).build().is_err());
        assert!(base().edge_detection_threshold(f32::NAN).build().is_err());
        assert!(base().width_range(0.3, 0.3).min_area(0.0).build().is_ok());
    }

    #[test]
    fn test_options_from_json() {
        let options = FilterOptions::from_json(
            r#"{"erosion_element": "cross", "dilation_element": "rectangle", "dilation_size": 0, "max_width": 0.5}"#,
        )
        .expect("valid json");
        let config = FilterConfiguration::try_from(options).expect("valid options");

        assert_eq!(config.erosion_shape(), KernelShape::Cross);
        assert_eq!(config.dilation_shape(), KernelShape::Rectangle);
        assert_eq!(config.dilation_size(), 0);
        assert_eq!(config.erosion_size(), DEFAULT_EROSION_SIZE);
        assert_eq!(config.max_width_fraction(), 0.5);
    }

    #[test]
    fn test_options_reject_unknown_fields() {
        let err = FilterOptions::from_json(r#"{"blur": 3}"#).unwrap_err();
        assert!(matches!(err, FigureError::Serialization(_)));
    }

    #[test]
    fn test_options_schema_lists_fields() {
        let schema = serde_json::to_value(FilterOptions::schema()).expect("schema serializes");
        let properties = &schema["properties"];
        assert!(properties.get("erosion_element").is_some());
        assert!(properties.get("max_width").is_some());
    }
}
