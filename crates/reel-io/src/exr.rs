//! OpenEXR tag and layer mapping.
//!
//! EXR byte-level decoding belongs to a dedicated library; what lives here
//! is the structural transform between EXR's header model and ours. That
//! covers grouping `"layerName.R"`-style channel names into layers,
//! per-channel sample types with half-float conversions, and the mapping
//! between EXR's standard attributes and [`Tags`]. The shape mirrors the
//! other codecs' read/write contract: [`read_tags`] and [`write_tags`] are
//! the `read`/`write` of this sublayer.

use half::f16;
use smallvec::SmallVec;

use crate::info::{TAG_CREATOR, TAG_DESCRIPTION, TAG_KEYCODE, TAG_TIME, TAG_TIMECODE, Tags};

/// Per-channel sample type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleType {
    /// 32-bit unsigned integer.
    U32,
    /// 16-bit float.
    #[default]
    F16,
    /// 32-bit float.
    F32,
}

impl SampleType {
    /// Returns the storage bytes per sample.
    pub fn bytes(self) -> usize {
        match self {
            SampleType::F16 => 2,
            SampleType::U32 | SampleType::F32 => 4,
        }
    }
}

/// Converts a raw half-float sample to `f32`.
#[inline]
pub fn half_to_f32(bits: u16) -> f32 {
    f16::from_bits(bits).to_f32()
}

/// Converts an `f32` to a raw half-float sample.
#[inline]
pub fn f32_to_half(v: f32) -> u16 {
    f16::from_f32(v).to_bits()
}

/// A single EXR channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Full channel name as stored in the file, e.g. `diffuse.R`.
    pub name: String,
    /// Sample type.
    pub sample_type: SampleType,
    /// X/Y subsampling factors.
    pub sampling: (u32, u32),
}

impl Channel {
    /// Creates a channel with no subsampling.
    pub fn new(name: impl Into<String>, sample_type: SampleType) -> Self {
        Self {
            name: name.into(),
            sample_type,
            sampling: (1, 1),
        }
    }

    /// Returns the short name: the part after the last dot.
    pub fn short_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(i) => &self.name[i + 1..],
            None => &self.name,
        }
    }

    /// Returns the layer prefix: the part before the last dot, empty for
    /// bare channels.
    pub fn layer_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(i) => &self.name[..i],
            None => "",
        }
    }
}

/// A group of channels sharing a layer prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Layer prefix; empty for the default layer of bare channels.
    pub name: String,
    /// Member channels, in file order.
    pub channels: SmallVec<[Channel; 4]>,
}

impl Layer {
    /// Returns a display name: the prefix, or `"default"` when empty.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "default"
        } else {
            &self.name
        }
    }
}

/// Joins a layer prefix and a short channel name into a file channel name.
pub fn channel_name(layer: &str, channel: &str) -> String {
    if layer.is_empty() {
        channel.to_string()
    } else {
        format!("{}.{}", layer, channel)
    }
}

/// Groups channels into layers by their name prefix.
///
/// Bare channel names (`R`, `G`, `B`, `A`, `Z`) fall into a default layer
/// with an empty prefix. Layer order follows first appearance; channel
/// order within a layer follows file order.
pub fn parse_layers<I: IntoIterator<Item = Channel>>(channels: I) -> Vec<Layer> {
    let mut layers: Vec<Layer> = Vec::new();
    for channel in channels {
        let prefix = channel.layer_name().to_string();
        match layers.iter_mut().find(|l| l.name == prefix) {
            Some(layer) => layer.channels.push(channel),
            None => layers.push(Layer {
                name: prefix,
                channels: SmallVec::from_iter([channel]),
            }),
        }
    }
    layers
}

/// EXR standard attribute names and their tag keys.
const ATTR_TAGS: &[(&str, &str)] = &[
    ("owner", TAG_CREATOR),
    ("comments", TAG_DESCRIPTION),
    ("capDate", TAG_TIME),
    ("keyCode", TAG_KEYCODE),
    ("timeCode", TAG_TIMECODE),
];

fn attr_to_tag(name: &str) -> Option<&'static str> {
    ATTR_TAGS.iter().find(|(a, _)| *a == name).map(|(_, t)| *t)
}

fn tag_to_attr(key: &str) -> Option<&'static str> {
    ATTR_TAGS.iter().find(|(_, t)| *t == key).map(|(a, _)| *a)
}

/// Maps an EXR attribute list to [`Tags`].
///
/// Standard attributes translate to their well-known tag keys; any other
/// string attribute passes through under its own name.
pub fn read_tags<'a, I>(attrs: I) -> Tags
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut tags = Tags::new();
    for (name, value) in attrs {
        match attr_to_tag(name) {
            Some(key) => tags.set(key, value),
            None => tags.set(name, value),
        }
    }
    tags
}

/// Maps [`Tags`] back to an EXR attribute list, inverting [`read_tags`].
pub fn write_tags(tags: &Tags) -> Vec<(String, String)> {
    tags.iter()
        .map(|(key, value)| {
            let name = tag_to_attr(key).unwrap_or(key);
            (name.to_string(), value.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layers() {
        let layers = parse_layers([
            Channel::new("R", SampleType::F16),
            Channel::new("G", SampleType::F16),
            Channel::new("B", SampleType::F16),
            Channel::new("diffuse.R", SampleType::F16),
            Channel::new("diffuse.G", SampleType::F16),
            Channel::new("Z", SampleType::F32),
            Channel::new("specular.R", SampleType::F16),
        ]);
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[0].name, "");
        assert_eq!(layers[0].display_name(), "default");
        assert_eq!(layers[0].channels.len(), 4); // R G B Z
        assert_eq!(layers[1].name, "diffuse");
        assert_eq!(layers[1].channels[0].short_name(), "R");
        assert_eq!(layers[2].name, "specular");
    }

    #[test]
    fn test_nested_layer_names() {
        let layers = parse_layers([Channel::new("light.back.R", SampleType::F16)]);
        assert_eq!(layers[0].name, "light.back");
        assert_eq!(layers[0].channels[0].short_name(), "R");
        assert_eq!(channel_name("light.back", "R"), "light.back.R");
        assert_eq!(channel_name("", "R"), "R");
    }

    #[test]
    fn test_tags_round_trip() {
        let mut tags = Tags::new();
        tags.set(TAG_CREATOR, "renderer");
        tags.set(TAG_TIME, "2004:06:01 12:00:00");
        tags.set("wrapmodes", "clamp,clamp");

        let attrs = write_tags(&tags);
        assert!(attrs.contains(&("owner".to_string(), "renderer".to_string())));
        assert!(attrs.contains(&("wrapmodes".to_string(), "clamp,clamp".to_string())));

        let back = read_tags(attrs.iter().map(|(a, b)| (a.as_str(), b.as_str())));
        assert_eq!(back, tags);
    }

    #[test]
    fn test_sample_types() {
        assert_eq!(SampleType::F16.bytes(), 2);
        assert_eq!(SampleType::F32.bytes(), 4);
        assert_eq!(half_to_f32(f32_to_half(0.5)), 0.5);
        assert_eq!(half_to_f32(0x3C00), 1.0);
    }
}
