//! A small SVG writer covering what the map needs: circles, polylines and
//! text with optional fill/stroke styling.
//!
//! Numbers are printed the way C++ iostreams print a `double` by default
//! (six significant digits, `%g`), so rendered maps stay comparable with
//! existing reference outputs.

use std::fmt::{self, Display, Write};

use serde::Deserialize;

const PRECISION: usize = 6;
const INDENT_STEP: usize = 2;

/// Formats `value` like `std::ostream << double` with default flags.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_owned();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let scientific = format!("{:.*e}", PRECISION - 1, value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or_default();

    if exponent < -4 || exponent >= PRECISION as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (PRECISION as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_owned()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

struct Number(f64);

impl Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_number(self.0))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Color {
    #[default]
    None,
    Named(String),
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, f64),
}

impl From<&str> for Color {
    fn from(name: &str) -> Self {
        Color::Named(name.to_owned())
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::None => f.write_str("none"),
            Color::Named(name) => f.write_str(name),
            Color::Rgb(red, green, blue) => write!(f, "rgb({red},{green},{blue})"),
            Color::Rgba(red, green, blue, opacity) => {
                write!(f, "rgba({red},{green},{blue},{})", Number(*opacity))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeLineCap {
    Butt,
    Round,
    Square,
}

impl Display for StrokeLineCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrokeLineCap::Butt => "butt",
            StrokeLineCap::Round => "round",
            StrokeLineCap::Square => "square",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeLineJoin {
    Arcs,
    Bevel,
    Miter,
    MiterClip,
    Round,
}

impl Display for StrokeLineJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrokeLineJoin::Arcs => "arcs",
            StrokeLineJoin::Bevel => "bevel",
            StrokeLineJoin::Miter => "miter",
            StrokeLineJoin::MiterClip => "miter-clip",
            StrokeLineJoin::Round => "round",
        })
    }
}

/// Presentation attributes shared by every shape. Unset ones are omitted.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PathProps {
    fill: Option<Color>,
    stroke: Option<Color>,
    stroke_width: Option<f64>,
    line_cap: Option<StrokeLineCap>,
    line_join: Option<StrokeLineJoin>,
}

impl PathProps {
    fn render_attrs(&self, out: &mut impl Write) -> fmt::Result {
        if let Some(fill) = &self.fill {
            write!(out, " fill=\"{fill}\"")?;
        }
        if let Some(stroke) = &self.stroke {
            write!(out, " stroke=\"{stroke}\"")?;
        }
        if let Some(width) = self.stroke_width {
            write!(out, " stroke-width=\"{}\"", Number(width))?;
        }
        if let Some(cap) = self.line_cap {
            write!(out, " stroke-linecap=\"{cap}\"")?;
        }
        if let Some(join) = self.line_join {
            write!(out, " stroke-linejoin=\"{join}\"")?;
        }
        Ok(())
    }
}

/// Builder-style setters for anything carrying [`PathProps`].
pub trait Styled: Sized {
    fn props_mut(&mut self) -> &mut PathProps;

    fn fill(mut self, color: impl Into<Color>) -> Self {
        self.props_mut().fill = Some(color.into());
        self
    }

    fn stroke(mut self, color: impl Into<Color>) -> Self {
        self.props_mut().stroke = Some(color.into());
        self
    }

    fn stroke_width(mut self, width: f64) -> Self {
        self.props_mut().stroke_width = Some(width);
        self
    }

    fn line_cap(mut self, cap: StrokeLineCap) -> Self {
        self.props_mut().line_cap = Some(cap);
        self
    }

    fn line_join(mut self, join: StrokeLineJoin) -> Self {
        self.props_mut().line_join = Some(join);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    center: Point,
    radius: f64,
    props: PathProps,
}

impl Default for Circle {
    fn default() -> Self {
        Self {
            center: Point::default(),
            radius: 1.0,
            props: PathProps::default(),
        }
    }
}

impl Circle {
    pub fn center(mut self, center: Point) -> Self {
        self.center = center;
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    fn render(&self, out: &mut impl Write) -> fmt::Result {
        write!(
            out,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"",
            Number(self.center.x),
            Number(self.center.y),
            Number(self.radius)
        )?;
        self.props.render_attrs(out)?;
        out.write_str("/>")
    }
}

impl Styled for Circle {
    fn props_mut(&mut self) -> &mut PathProps {
        &mut self.props
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Point>,
    props: PathProps,
}

impl Polyline {
    pub fn point(mut self, point: Point) -> Self {
        self.points.push(point);
        self
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    fn render(&self, out: &mut impl Write) -> fmt::Result {
        out.write_str("<polyline points=\"")?;
        for (index, point) in self.points.iter().enumerate() {
            if index > 0 {
                out.write_char(' ')?;
            }
            write!(out, "{},{}", Number(point.x), Number(point.y))?;
        }
        out.write_char('"')?;
        self.props.render_attrs(out)?;
        out.write_str("/>")
    }
}

impl Extend<Point> for Polyline {
    fn extend<I: IntoIterator<Item = Point>>(&mut self, points: I) {
        self.points.extend(points);
    }
}

impl Styled for Polyline {
    fn props_mut(&mut self) -> &mut PathProps {
        &mut self.props
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    position: Point,
    offset: Point,
    font_size: u32,
    font_family: Option<String>,
    font_weight: Option<String>,
    data: String,
    props: PathProps,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            position: Point::default(),
            offset: Point::default(),
            font_size: 1,
            font_family: None,
            font_weight: None,
            data: String::new(),
            props: PathProps::default(),
        }
    }
}

impl Text {
    pub fn position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    pub fn font_size(mut self, size: u32) -> Self {
        self.font_size = size;
        self
    }

    pub fn font_family(mut self, family: &str) -> Self {
        self.font_family = Some(family.to_owned());
        self
    }

    pub fn font_weight(mut self, weight: &str) -> Self {
        self.font_weight = Some(weight.to_owned());
        self
    }

    pub fn data(mut self, data: &str) -> Self {
        self.data = data.to_owned();
        self
    }

    fn render(&self, out: &mut impl Write) -> fmt::Result {
        out.write_str("<text")?;
        self.props.render_attrs(out)?;
        write!(
            out,
            " x=\"{}\" y=\"{}\" dx=\"{}\" dy=\"{}\" font-size=\"{}\"",
            Number(self.position.x),
            Number(self.position.y),
            Number(self.offset.x),
            Number(self.offset.y),
            self.font_size
        )?;
        if let Some(family) = &self.font_family {
            write!(out, " font-family=\"{family}\"")?;
        }
        if let Some(weight) = &self.font_weight {
            write!(out, " font-weight=\"{weight}\"")?;
        }
        write!(out, ">{}</text>", escape(&self.data))
    }
}

impl Styled for Text {
    fn props_mut(&mut self) -> &mut PathProps {
        &mut self.props
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Circle(Circle),
    Polyline(Polyline),
    Text(Text),
}

impl From<Circle> for Element {
    fn from(circle: Circle) -> Self {
        Element::Circle(circle)
    }
}

impl From<Polyline> for Element {
    fn from(polyline: Polyline) -> Self {
        Element::Polyline(polyline)
    }
}

impl From<Text> for Element {
    fn from(text: Text) -> Self {
        Element::Text(text)
    }
}

impl Element {
    fn render(&self, out: &mut impl Write, indent: usize) -> fmt::Result {
        write!(out, "{:indent$}", "")?;
        match self {
            Element::Circle(circle) => circle.render(out)?,
            Element::Polyline(polyline) => polyline.render(out)?,
            Element::Text(text) => text.render(out)?,
        }
        out.write_char('\n')
    }
}

/// Elements in drawing order; later elements paint over earlier ones.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn add(&mut self, element: impl Into<Element>) {
        self.elements.push(element.into());
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn render(&self, out: &mut impl Write) -> fmt::Result {
        out.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n")?;
        out.write_str("<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\">\n")?;
        for element in &self.elements {
            element.render(out, INDENT_STEP)?;
        }
        out.write_str("</svg>\n")
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f)
    }
}
