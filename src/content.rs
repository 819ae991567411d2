//! Content-stream interpretation with the `pdf` crate.
//!
//! Walks a page's operators once, tracking the graphics and text state, and
//! records where text runs, images and painted paths land on the page.

use std::collections::HashMap;

use pdf::content::{FormXObject, Matrix, Op, Point, TextDrawAdjusted};
use pdf::error::PdfError;
use pdf::font::{Font, ToUnicodeMap, Widths};
use pdf::object::{Object, Page, Resolve, Resources, XObject};
use pdf::primitive::{Name, PdfString};

use crate::geometry::Rect;
use crate::page::RawTextBlock;
use crate::text_blocks::{TextChunk, group_blocks};

/// Glyph extent above the baseline, in units of font size.
const ASCENT: f32 = 0.8;
/// Glyph extent below the baseline, in units of font size.
const DESCENT: f32 = 0.2;
/// Advance for fonts without a width table (non-embedded standard fonts),
/// in thousandths of an em.
const FALLBACK_GLYPH_WIDTH: f32 = 500.0;
/// Form XObjects nested deeper than this are skipped.
const MAX_FORM_DEPTH: usize = 12;

type FontMap = HashMap<String, ResolvedFont>;

/// Geometry of one page in top-left-origin page space.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub bounds: Rect,
    pub text_blocks: Vec<RawTextBlock>,
    pub images: Vec<Rect>,
    pub drawings: Vec<Rect>,
}

/// Maps PDF user space (y up, origin at the media box corner) to page space.
#[derive(Debug, Clone, Copy)]
struct PageFrame {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

impl PageFrame {
    fn to_page(&self, rect: &Rect) -> Rect {
        Rect::new(
            rect.x0 - self.left,
            self.top - rect.y1,
            rect.x1 - self.left,
            self.top - rect.y0,
        )
    }

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Text parameters; part of the graphics state, so `q`/`Q` save them.
#[derive(Debug, Clone)]
struct TextParams {
    font: Option<String>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    rise: f32,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 100.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct GraphicsState {
    ctm: Matrix,
    text: TextParams,
}

/// Text and line matrices of the current `BT`/`ET` object.
#[derive(Debug, Default)]
struct TextObject {
    text_matrix: Matrix,
    line_matrix: Matrix,
}

impl TextObject {
    fn begin(&mut self) {
        *self = Self::default();
    }

    fn set_matrix(&mut self, matrix: Matrix) {
        self.text_matrix = matrix;
        self.line_matrix = matrix;
    }

    fn translate_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply_matrix(&translation(tx, ty), &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn translate_text(&mut self, tx: f32) {
        self.text_matrix = multiply_matrix(&translation(tx, 0.0), &self.text_matrix);
    }
}

struct ResolvedFont {
    widths: Option<Widths>,
    to_unicode: Option<ToUnicodeMap>,
    is_cid: bool,
}

impl ResolvedFont {
    fn from_font(font: &Font, resolver: &impl Resolve) -> Result<Self, PdfError> {
        let widths = font.widths(resolver)?;
        let to_unicode = match font.to_unicode(resolver) {
            Some(map) => Some(map?),
            None => None,
        };
        Ok(Self {
            widths,
            to_unicode,
            is_cid: font.is_cid(),
        })
    }

    fn decode(&self, text: &PdfString) -> DecodedText {
        let bytes = text.as_bytes();
        let map = self.to_unicode.as_ref();
        if self.is_cid {
            let codes = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
            decode_codes(codes, map)
        } else {
            decode_codes(bytes.iter().map(|&byte| byte as u16), map)
        }
    }

    fn glyph_width(&self, code: u16) -> f32 {
        self.widths
            .as_ref()
            .map(|w| w.get(code as usize))
            .unwrap_or(FALLBACK_GLYPH_WIDTH)
    }
}

/// Decoded text plus the character codes used for advance widths.
struct DecodedText {
    text: String,
    codes: Vec<u16>,
}

fn decode_codes(codes: impl Iterator<Item = u16>, map: Option<&ToUnicodeMap>) -> DecodedText {
    let mut text = String::new();
    let mut collected = Vec::new();
    for code in codes {
        collected.push(code);
        match map.and_then(|map| map.get(code)) {
            Some(value) => text.push_str(value),
            None => text.push(char::from_u32(code as u32).unwrap_or('\u{FFFD}')),
        }
    }
    DecodedText {
        text,
        codes: collected,
    }
}

fn fallback_decode(text: &PdfString) -> DecodedText {
    DecodedText {
        text: text.to_string_lossy(),
        codes: text.as_bytes().iter().map(|&b| b as u16).collect(),
    }
}

fn text_displacement(font: Option<&ResolvedFont>, codes: &[u16], params: &TextParams) -> f32 {
    let mut total = 0.0;
    for &code in codes {
        let glyph_width = font.map_or(FALLBACK_GLYPH_WIDTH, |f| f.glyph_width(code));
        let mut advance = (glyph_width / 1000.0) * params.font_size;
        advance += params.char_spacing;
        if code == 32 {
            advance += params.word_spacing;
        }
        total += advance;
    }
    total * (params.horizontal_scale / 100.0)
}

fn translation(tx: f32, ty: f32) -> Matrix {
    Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: tx,
        f: ty,
    }
}

/// `left × right`: apply `left` first, then `right`.
fn multiply_matrix(left: &Matrix, right: &Matrix) -> Matrix {
    Matrix {
        a: left.a * right.a + left.b * right.c,
        b: left.a * right.b + left.b * right.d,
        c: left.c * right.a + left.d * right.c,
        d: left.c * right.b + left.d * right.d,
        e: left.e * right.a + left.f * right.c + right.e,
        f: left.e * right.b + left.f * right.d + right.f,
    }
}

fn apply_matrix(matrix: &Matrix, point: (f32, f32)) -> (f32, f32) {
    (
        matrix.a * point.0 + matrix.c * point.1 + matrix.e,
        matrix.b * point.0 + matrix.d * point.1 + matrix.f,
    )
}

/// Bounding box of the axis-aligned box `(x0, y0)-(x1, y1)` under `matrix`.
fn transformed_box(matrix: &Matrix, x0: f32, y0: f32, x1: f32, y1: f32) -> Option<Rect> {
    Rect::bounding(
        [(x0, y0), (x1, y0), (x0, y1), (x1, y1)]
            .into_iter()
            .map(|corner| apply_matrix(matrix, corner)),
    )
}

fn collect_fonts(resources: &Resources, resolver: &impl Resolve) -> FontMap {
    let mut fonts = HashMap::new();
    for (name, font) in resources.fonts.iter() {
        let resolved = font
            .load(resolver)
            .and_then(|font| ResolvedFont::from_font(&font, resolver));
        match resolved {
            Ok(resolved) => {
                fonts.insert(name.as_str().to_owned(), resolved);
            }
            Err(err) => log::debug!("font {}: {err}", name.as_str()),
        }
    }
    fonts
}

/// Points of the path under construction, already in user space.
#[derive(Debug, Default)]
struct PathBuilder {
    points: Vec<(f32, f32)>,
}

impl PathBuilder {
    fn add(&mut self, ctm: &Matrix, point: &Point) {
        self.points.push(apply_matrix(ctm, (point.x, point.y)));
    }

    fn paint(&mut self) -> Option<Rect> {
        Rect::bounding(self.points.drain(..))
    }

    fn discard(&mut self) {
        self.points.clear();
    }
}

struct Interpreter<'r, R> {
    resolver: &'r R,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    /// `Q` never pops below this; forms run on their own segment.
    stack_floor: usize,
    text: TextObject,
    path: PathBuilder,
    chunks: Vec<TextChunk>,
    images: Vec<Rect>,
    drawings: Vec<Rect>,
}

impl<'r, R: Resolve> Interpreter<'r, R> {
    fn new(resolver: &'r R) -> Self {
        Self {
            resolver,
            state: GraphicsState::default(),
            stack: Vec::new(),
            stack_floor: 0,
            text: TextObject::default(),
            path: PathBuilder::default(),
            chunks: Vec::new(),
            images: Vec::new(),
            drawings: Vec::new(),
        }
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if self.stack.len() > self.stack_floor {
            if let Some(state) = self.stack.pop() {
                self.state = state;
            }
        }
    }

    fn text_draw(&mut self, text: &PdfString, fonts: &FontMap) {
        let params = &self.state.text;
        let font = params.font.as_ref().and_then(|name| fonts.get(name));
        let decoded = match font {
            Some(resolved) => resolved.decode(text),
            None => fallback_decode(text),
        };
        let displacement = text_displacement(font, &decoded.codes, params);
        if !decoded.text.is_empty() {
            let size = params.font_size;
            let to_user = multiply_matrix(&self.text.text_matrix, &self.state.ctm);
            let rect = transformed_box(
                &to_user,
                0.0,
                params.rise - DESCENT * size,
                displacement,
                params.rise + ASCENT * size,
            );
            if let Some(rect) = rect {
                // Rendered size after text and graphics scaling.
                let scale = (to_user.c * to_user.c + to_user.d * to_user.d).sqrt();
                self.chunks.push(TextChunk {
                    text: decoded.text,
                    rect,
                    font_size: (size * scale).abs(),
                });
            }
        }
        if displacement != 0.0 {
            self.text.translate_text(displacement);
        }
    }

    fn text_adjusted(&mut self, array: &[TextDrawAdjusted], fonts: &FontMap) {
        for item in array {
            match item {
                TextDrawAdjusted::Text(text) => self.text_draw(text, fonts),
                TextDrawAdjusted::Spacing(amount) => {
                    let params = &self.state.text;
                    let adjustment =
                        -amount / 1000.0 * params.font_size * (params.horizontal_scale / 100.0);
                    if adjustment != 0.0 {
                        self.text.translate_text(adjustment);
                    }
                }
            }
        }
    }

    fn place_image(&mut self) {
        if let Some(rect) = transformed_box(&self.state.ctm, 0.0, 0.0, 1.0, 1.0) {
            self.images.push(rect);
        }
    }

    fn paint_path(&mut self) {
        if let Some(rect) = self.path.paint() {
            self.drawings.push(rect);
        }
    }

    fn draw_xobject(
        &mut self,
        name: &Name,
        resources: Option<&Resources>,
        fonts: &FontMap,
        depth: usize,
    ) {
        let Some(xobject_ref) = resources.and_then(|res| res.xobjects.get(name)) else {
            log::debug!("xobject {}: not in resources", name.as_str());
            return;
        };
        let xobject = match self.resolver.get(*xobject_ref) {
            Ok(xobject) => xobject,
            Err(err) => {
                log::debug!("xobject {}: {err}", name.as_str());
                return;
            }
        };
        match &*xobject {
            XObject::Image(_) => self.place_image(),
            XObject::Form(form) => self.run_form(form, resources, fonts, depth),
            XObject::Postscript(_) => {}
        }
    }

    /// Interpret a form XObject in place: its matrix is applied on top of the
    /// CTM and its own resources shadow the caller's.
    fn run_form(
        &mut self,
        form: &FormXObject,
        resources: Option<&Resources>,
        fonts: &FontMap,
        depth: usize,
    ) {
        if depth >= MAX_FORM_DEPTH {
            log::debug!("form xobject nested deeper than {MAX_FORM_DEPTH}; skipped");
            return;
        }
        let ops = match form.operations(self.resolver) {
            Ok(ops) => ops,
            Err(err) => {
                log::debug!("form xobject: {err}");
                return;
            }
        };
        let dict = form.dict();
        let matrix = dict
            .matrix
            .as_ref()
            .and_then(|primitive| Matrix::from_primitive(primitive.clone(), self.resolver).ok())
            .unwrap_or_default();
        let own_fonts;
        let (resources, fonts) = match &dict.resources {
            Some(own) => {
                own_fonts = collect_fonts(own, self.resolver);
                (Some(&**own), &own_fonts)
            }
            None => (resources, fonts),
        };

        let outer_floor = self.stack_floor;
        let outer_path = std::mem::take(&mut self.path);
        self.save();
        self.stack_floor = self.stack.len();
        self.state.ctm = multiply_matrix(&matrix, &self.state.ctm);

        self.run(&ops, resources, fonts, depth + 1);

        self.stack.truncate(self.stack_floor);
        self.stack_floor = outer_floor;
        self.restore();
        self.path = outer_path;
    }

    fn run(&mut self, ops: &[Op], resources: Option<&Resources>, fonts: &FontMap, depth: usize) {
        for op in ops {
            match op {
                Op::Save => self.save(),
                Op::Restore => self.restore(),
                Op::Transform { matrix } => {
                    self.state.ctm = multiply_matrix(matrix, &self.state.ctm)
                }

                Op::MoveTo { p } | Op::LineTo { p } => self.path.add(&self.state.ctm, p),
                Op::CurveTo { c1, c2, p } => {
                    self.path.add(&self.state.ctm, c1);
                    self.path.add(&self.state.ctm, c2);
                    self.path.add(&self.state.ctm, p);
                }
                Op::Rect { rect } => {
                    for (x, y) in [
                        (rect.x, rect.y),
                        (rect.x + rect.width, rect.y + rect.height),
                        (rect.x, rect.y + rect.height),
                        (rect.x + rect.width, rect.y),
                    ] {
                        self.path.add(&self.state.ctm, &Point { x, y });
                    }
                }
                Op::Stroke | Op::Fill { .. } | Op::FillAndStroke { .. } => self.paint_path(),
                Op::EndPath => self.path.discard(),

                Op::BeginText => self.text.begin(),
                Op::SetTextMatrix { matrix } => self.text.set_matrix(*matrix),
                Op::MoveTextPosition { translation } => {
                    self.text.translate_line(translation.x, translation.y)
                }
                Op::TextNewline => self.text.translate_line(0.0, -self.state.text.leading),
                Op::TextFont { name, size } => {
                    self.state.text.font = Some(name.as_str().to_owned());
                    self.state.text.font_size = *size;
                }
                Op::CharSpacing { char_space } => self.state.text.char_spacing = *char_space,
                Op::WordSpacing { word_space } => self.state.text.word_spacing = *word_space,
                Op::TextScaling { horiz_scale } => {
                    self.state.text.horizontal_scale = *horiz_scale
                }
                Op::Leading { leading } => self.state.text.leading = *leading,
                Op::TextRise { rise } => self.state.text.rise = *rise,
                Op::TextDraw { text } => self.text_draw(text, fonts),
                Op::TextDrawAdjusted { array } => self.text_adjusted(array, fonts),

                Op::XObject { name } => self.draw_xobject(name, resources, fonts, depth),
                Op::InlineImage { .. } => self.place_image(),
                _ => {}
            }
        }
    }
}

impl PageLayout {
    /// Interpret `page`'s content stream and collect its layout primitives.
    pub fn parse(page: &Page, resolver: &impl Resolve) -> Result<Self, PdfError> {
        let media = page.media_box()?;
        let frame = PageFrame {
            left: media.left.min(media.right),
            top: media.top.max(media.bottom),
            width: (media.right - media.left).abs(),
            height: (media.top - media.bottom).abs(),
        };
        let content = match &page.contents {
            Some(content) => content,
            None => {
                return Ok(Self {
                    bounds: frame.bounds(),
                    ..Self::default()
                });
            }
        };
        let operations = content.operations(resolver)?;
        let resources = page.resources().ok().map(|resources| &**resources);
        let fonts = resources
            .map(|resources| collect_fonts(resources, resolver))
            .unwrap_or_default();
        let mut interpreter = Interpreter::new(resolver);
        interpreter.run(&operations, resources, &fonts, 0);

        let chunks: Vec<TextChunk> = interpreter
            .chunks
            .into_iter()
            .map(|chunk| TextChunk {
                rect: frame.to_page(&chunk.rect),
                ..chunk
            })
            .collect();
        Ok(Self {
            bounds: frame.bounds(),
            text_blocks: group_blocks(&chunks),
            images: interpreter.images.iter().map(|r| frame.to_page(r)).collect(),
            drawings: interpreter.drawings.iter().map(|r| frame.to_page(r)).collect(),
        })
    }
}
