//! Legacy storyboard text encoder.
//!
//! Produces the `[Events]` section of an `.osb` file. Every element becomes a header line
//! followed by its commands, one per line, in chronological order across all properties.
//! Loops (`L`) and triggers (`T`) follow the main commands with their bodies indented one extra
//! space.

use std::fmt::Write as _;

use crate::{
    animation::command::{CommandValue, Timeline},
    animation::timeline::TimelineGroup,
    foundation::core::{Layer, Rgb, Vec2},
    foundation::error::StoryResult,
    foundation::math::{fmt_fraction, fmt_int},
    generate::generator::Encoder,
    scene::element::{Animation, Sample, Sprite, Video},
};

/// Destination section of a built block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Video,
    Layer(Layer),
    Samples,
}

/// Encoded text of one element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextBlock {
    pub section: Section,
    /// Newline-terminated lines.
    pub text: String,
}

/// Text buffers of one encoded storyboard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OsbDocument {
    video: String,
    layers: [String; 5],
    samples: String,
}

impl OsbDocument {
    pub fn video(&self) -> &str {
        &self.video
    }

    pub fn layer(&self, layer: Layer) -> &str {
        &self.layers[layer.index() as usize]
    }

    pub fn samples(&self) -> &str {
        &self.samples
    }

    /// The complete `[Events]` section.
    pub fn render(&self) -> String {
        let mut out = String::from("[Events]\n//Background and Video events\n");
        out.push_str(&self.video);
        for layer in Layer::ALL {
            let _ = writeln!(out, "//Storyboard Layer {} ({})", layer.index(), layer.name());
            out.push_str(self.layer(layer));
        }
        out.push_str("//Storyboard Sound Samples\n");
        out.push_str(&self.samples);
        out
    }
}

/// Encoder producing an [`OsbDocument`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TextEncoder;

impl TextEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder for TextEncoder {
    type Context = OsbDocument;
    type Built = TextBlock;

    fn pre_generate(&mut self) -> OsbDocument {
        OsbDocument::default()
    }

    fn build_sprite(&mut self, sprite: &Sprite) -> StoryResult<TextBlock> {
        let mut text = header("Sprite", sprite);
        text.push('\n');
        write_body(&mut text, sprite)?;
        Ok(TextBlock {
            section: Section::Layer(sprite.layer),
            text,
        })
    }

    fn build_animation(&mut self, animation: &Animation) -> StoryResult<TextBlock> {
        let sprite = &animation.sprite;
        let mut text = header("Animation", sprite);
        let _ = writeln!(
            text,
            ",{},{},{}",
            animation.frame_count,
            fmt_fraction(animation.frame_delay),
            animation.loop_type.name()
        );
        write_body(&mut text, sprite)?;
        Ok(TextBlock {
            section: Section::Layer(sprite.layer),
            text,
        })
    }

    fn build_sample(&mut self, sample: &Sample) -> StoryResult<TextBlock> {
        Ok(TextBlock {
            section: Section::Samples,
            text: format!(
                "Sample,{},{},\"{}\",{}\n",
                fmt_int(sample.start_time),
                sample.layer.index(),
                sample.path,
                fmt_int(sample.volume)
            ),
        })
    }

    fn build_video(&mut self, video: &Video) -> StoryResult<TextBlock> {
        Ok(TextBlock {
            section: Section::Video,
            text: format!("Video,{},\"{}\"\n", fmt_int(video.start_time), video.path),
        })
    }

    fn emit(&mut self, ctx: &mut OsbDocument, _layer: Layer, built: &TextBlock) {
        let buf = match built.section {
            Section::Video => &mut ctx.video,
            Section::Layer(layer) => &mut ctx.layers[layer.index() as usize],
            Section::Samples => &mut ctx.samples,
        };
        buf.push_str(&built.text);
    }
}

fn header(kind: &str, sprite: &Sprite) -> String {
    format!(
        "{kind},{},{},\"{}\",{},{}",
        sprite.layer.name(),
        sprite.origin.name(),
        sprite.path,
        fmt_int(sprite.initial_position.x),
        fmt_int(sprite.initial_position.y)
    )
}

fn write_body(text: &mut String, sprite: &Sprite) -> StoryResult<()> {
    sprite.check_windows()?;
    for line in command_lines(&sprite.timeline) {
        let _ = writeln!(text, " {line}");
    }
    for l in &sprite.loops {
        let _ = writeln!(text, " L,{},{}", fmt_int(l.start_time), l.repeat_count);
        for line in command_lines(&l.timeline) {
            let _ = writeln!(text, "  {line}");
        }
    }
    for t in &sprite.triggers {
        let _ = write!(
            text,
            " T,{},{},{}",
            t.name,
            fmt_int(t.start_time),
            fmt_int(t.end_time)
        );
        if t.group != 0 {
            let _ = write!(text, ",{}", t.group);
        }
        text.push('\n');
        for line in command_lines(&t.timeline) {
            let _ = writeln!(text, "  {line}");
        }
    }
    Ok(())
}

struct Line {
    start: f64,
    end: f64,
    text: String,
}

/// Command lines (without indentation) sorted by `(start, end)`; ties keep property order.
fn command_lines(tl: &TimelineGroup) -> Vec<String> {
    let mut lines = Vec::with_capacity(tl.command_count());
    push_lines(&mut lines, "M", &tl.position, fmt_vec_int);
    push_lines(&mut lines, "MX", &tl.x, |v| fmt_int(*v));
    push_lines(&mut lines, "MY", &tl.y, |v| fmt_int(*v));
    push_lines(&mut lines, "S", &tl.scale, |v| fmt_fraction(*v));
    push_lines(&mut lines, "V", &tl.scale_vec, fmt_vec_fraction);
    push_lines(&mut lines, "R", &tl.rotation, |v| fmt_fraction(*v));
    push_lines(&mut lines, "F", &tl.opacity, |v| fmt_fraction(*v));
    push_lines(&mut lines, "C", &tl.color, fmt_color);
    push_lines(&mut lines, "P", &tl.flip_h, |_| "H".to_string());
    push_lines(&mut lines, "P", &tl.flip_v, |_| "V".to_string());
    push_lines(&mut lines, "P", &tl.additive, |_| "A".to_string());
    lines.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.end.total_cmp(&b.end)));
    lines.into_iter().map(|l| l.text).collect()
}

fn push_lines<T: CommandValue>(
    lines: &mut Vec<Line>,
    code: &str,
    tl: &Timeline<T>,
    fmt: impl Fn(&T) -> String,
) {
    for cmd in tl.commands() {
        let start = fmt_int(cmd.start_time);
        let end = fmt_int(cmd.end_time);
        let end = if end == start { String::new() } else { end };
        let mut values = fmt(&cmd.start_value);
        let end_values = fmt(&cmd.end_value);
        if end_values != values {
            values.push(',');
            values.push_str(&end_values);
        }
        lines.push(Line {
            start: cmd.start_time,
            end: cmd.end_time,
            text: format!("{code},{},{start},{end},{values}", cmd.easing.code()),
        });
    }
}

fn fmt_vec_int(v: &Vec2) -> String {
    format!("{},{}", fmt_int(v.x), fmt_int(v.y))
}

fn fmt_vec_fraction(v: &Vec2) -> String {
    format!("{},{}", fmt_fraction(v.x), fmt_fraction(v.y))
}

fn fmt_color(c: &Rgb) -> String {
    format!("{},{},{}", fmt_int(c.r), fmt_int(c.g), fmt_int(c.b))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/text.rs"]
mod tests;
