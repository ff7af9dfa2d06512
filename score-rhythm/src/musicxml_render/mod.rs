//! MusicXML serialization of finalized items and voices.
//!
//! Only the rhythmic vocabulary is rendered: notes, rests and graces with
//! pitches, durations, ties, types, dots, tuplets and beams.

use serde::{Deserialize, Serialize};

use crate::{
    dom::Voice,
    error::{RhythmicError, RhythmicResult},
    primitives::{
        fraction_tools::lcm, Duration, RhythmicItem, TimeSignature, TupletBracket,
    },
};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Divisions per quarter. Computed from durations, if None.
    pub divisions: Option<u64>,
    /// Spaces per nesting level.
    pub indent: usize,
}
impl RenderSettings {
    pub fn with_divisions(divisions: u64) -> Self {
        Self {
            divisions: Some(divisions),
            ..Default::default()
        }
    }
}
impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            divisions: None,
            indent: 2,
        }
    }
}

pub trait RendersToMusicXml {
    /// Render at the given nesting level.
    fn render_musicxml(&self, settings: &RenderSettings, level: usize) -> RhythmicResult<String>;
}

/// Accumulates indented lines.
struct XmlWriter<'a> {
    settings: &'a RenderSettings,
    level: usize,
    buf: String,
}
impl<'a> XmlWriter<'a> {
    fn new(settings: &'a RenderSettings, level: usize) -> Self {
        Self {
            settings,
            level,
            buf: String::new(),
        }
    }
    fn line(&mut self, line: impl AsRef<str>) -> &mut Self {
        self.buf
            .push_str(&" ".repeat(self.level * self.settings.indent));
        self.buf.push_str(line.as_ref());
        self.buf.push('\n');
        self
    }
    fn open(&mut self, tag: impl AsRef<str>) -> &mut Self {
        self.line(format!("<{}>", tag.as_ref()));
        self.level += 1;
        self
    }
    fn close(&mut self, tag: &str) -> &mut Self {
        self.level = self.level.saturating_sub(1);
        self.line(format!("</{tag}>"))
    }
    fn element(&mut self, tag: &str, value: impl std::fmt::Display) -> &mut Self {
        self.line(format!("<{tag}>{value}</{tag}>"))
    }
    fn raw(&mut self, rendered: &str) -> &mut Self {
        self.buf.push_str(rendered);
        self
    }
    fn finish(self) -> String {
        self.buf
    }
}

/// Smallest divisions per quarter, which express all durations of the
/// voice as integers.
pub fn divisions(voice: &Voice) -> u64 {
    voice
        .beats()
        .iter()
        .flat_map(|beat| beat.items())
        .filter(|item| !item.duration().is_zero())
        .fold(1, |acc, item| lcm(acc, item.duration().denom()))
}

fn duration_in_divisions(duration: &Duration, divisions: u64) -> RhythmicResult<u64> {
    let (num, den) = (*duration * divisions).as_ratio();
    match den {
        1 => Ok(num),
        _ => Err(RhythmicError::InvalidDuration(format!(
            "{duration} is not expressible in {divisions} divisions per quarter"
        ))),
    }
}

impl RendersToMusicXml for TimeSignature {
    fn render_musicxml(&self, settings: &RenderSettings, level: usize) -> RhythmicResult<String> {
        let mut xml = XmlWriter::new(settings, level);
        xml.open("time")
            .element("beats", self.numerator)
            .element("beat-type", self.denominator)
            .close("time");
        Ok(xml.finish())
    }
}

/// Every pitch of chord is a separate `note` element, only the first one
/// carries beams and tuplet brackets.
impl RendersToMusicXml for RhythmicItem {
    fn render_musicxml(&self, settings: &RenderSettings, level: usize) -> RhythmicResult<String> {
        let note_type = match self.note_type() {
            Some(tp) => tp,
            None => return Err(RhythmicError::ChordTypeNotSet { index: 0 }),
        };
        let divisions = settings
            .divisions
            .unwrap_or_else(|| self.duration().denom());
        let duration = duration_in_divisions(self.duration(), divisions)?;
        let pitches = self.pitches();
        let notes = match self.is_rest() {
            true => 1,
            false => pitches.len(),
        };
        let mut xml = XmlWriter::new(settings, level);
        for n in 0..notes {
            xml.open("note");
            if self.is_grace() {
                xml.line("<grace/>");
            }
            if n > 0 {
                xml.line("<chord/>");
            }
            match pitches.get(n) {
                None => {
                    xml.line("<rest/>");
                }
                Some(pitch) => {
                    xml.open("pitch").element("step", pitch.step);
                    if pitch.alter != 0 {
                        xml.element("alter", pitch.alter);
                    }
                    xml.element("octave", pitch.octave).close("pitch");
                }
            }
            if !self.is_grace() {
                xml.element("duration", duration);
            }
            if self.tied_to_previous() {
                xml.line(r#"<tie type="stop"/>"#);
            }
            if self.tied_to_next() {
                xml.line(r#"<tie type="start"/>"#);
            }
            xml.element("type", note_type);
            for _ in 0..self.dots().unwrap_or(0) {
                xml.line("<dot/>");
            }
            if let Some(pitch) = pitches.get(n) {
                if let (true, Some(name)) = (pitch.show_accidental(), pitch.accidental_name()) {
                    xml.element("accidental", name);
                }
            }
            if let Some(tuplet) = self.tuplet() {
                xml.open("time-modification")
                    .element("actual-notes", tuplet.actual_notes)
                    .element("normal-notes", tuplet.normal_notes)
                    .element("normal-type", tuplet.normal_type)
                    .close("time-modification");
            }
            if n == 0 {
                for (number, value) in self.beams() {
                    xml.line(format!(r#"<beam number="{number}">{}</beam>"#, value.as_str()));
                }
            }
            let bracket = match n {
                0 => self.tuplet().and_then(|t| t.bracket),
                _ => None,
            };
            if self.tied_to_previous() || self.tied_to_next() || bracket.is_some() {
                xml.open("notations");
                if self.tied_to_previous() {
                    xml.line(r#"<tied type="stop"/>"#);
                }
                if self.tied_to_next() {
                    xml.line(r#"<tied type="start"/>"#);
                }
                match bracket {
                    Some(TupletBracket::Start) => {
                        xml.line(r#"<tuplet type="start" bracket="yes"/>"#);
                    }
                    Some(TupletBracket::Stop) => {
                        xml.line(r#"<tuplet type="stop"/>"#);
                    }
                    None => (),
                }
                xml.close("notations");
            }
            xml.close("note");
        }
        Ok(xml.finish())
    }
}

/// Renders `measure` elements. Divisions are written in the first measure,
/// time signature in the first measure and on every change.
impl RendersToMusicXml for Voice {
    fn render_musicxml(&self, settings: &RenderSettings, level: usize) -> RhythmicResult<String> {
        let divisions = settings.divisions.unwrap_or_else(|| divisions(self));
        let item_settings = RenderSettings {
            divisions: Some(divisions),
            ..*settings
        };
        let mut xml = XmlWriter::new(settings, level);
        let mut previous: Option<TimeSignature> = None;
        for measure in self.measures() {
            xml.open(format!(r#"measure number="{}""#, measure.index()));
            let time_signature = *measure.time_signature();
            if previous != Some(time_signature) {
                xml.open("attributes");
                if previous.is_none() {
                    xml.element("divisions", divisions);
                }
                xml.raw(&time_signature.render_musicxml(settings, level + 2)?);
                xml.close("attributes");
            }
            previous = Some(time_signature);
            for (number, beat_idx) in measure.beats().enumerate() {
                let beat = &self.beats()[beat_idx];
                for (index, item) in beat.items().iter().enumerate() {
                    let rendered = item
                        .render_musicxml(&item_settings, level + 1)
                        .map_err(|err| match err {
                            RhythmicError::ChordTypeNotSet { .. } => {
                                RhythmicError::ChordTypeNotSet { index }
                            }
                            other => other,
                        })
                        .map_err(|err| err.in_beat(measure.index(), number + 1))?;
                    xml.raw(&rendered);
                }
            }
            xml.close("measure");
        }
        Ok(xml.finish())
    }
}

/// Complete `score-partwise` document of a single part with one voice.
pub fn to_musicxml(voice: &Voice, settings: &RenderSettings) -> RhythmicResult<String> {
    let mut xml = XmlWriter::new(settings, 0);
    xml.line(r#"<?xml version="1.0" encoding="UTF-8"?>"#)
        .line(
            r#"<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 4.0 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">"#,
        )
        .open(r#"score-partwise version="4.0""#)
        .open("part-list")
        .open(r#"score-part id="P1""#)
        .element("part-name", "Music")
        .close("score-part")
        .close("part-list")
        .open(r#"part id="P1""#);
    xml.raw(&voice.render_musicxml(settings, 2)?);
    xml.close("part").close("score-partwise");
    Ok(xml.finish())
}

#[cfg(test)]
mod tests {
    use super::{divisions, to_musicxml, RenderSettings, RendersToMusicXml};
    use crate::{
        dom::Voice,
        error::RhythmicError,
        primitives::{
            BeamValue, Duration, NoteType, Pitch, RhythmicItem, Step, TimeSignature, TupletRatio,
            TupletBracket,
        },
        rhythm::RhythmicConfig,
    };

    fn dur(num: u64, den: u64) -> Duration {
        Duration::new(num, den).unwrap()
    }

    #[test]
    fn item() {
        let mut item =
            RhythmicItem::pitched(vec![Pitch::new(Step::C, 1, 4), Pitch::new(Step::E, 0, 4)], dur(1, 3))
                .unwrap();
        assert_eq!(
            item.render_musicxml(&RenderSettings::default(), 0),
            Err(RhythmicError::ChordTypeNotSet { index: 0 })
        );
        item.set_note_type(NoteType::Eighth).unwrap();
        item.set_dots(0).set_tied_to_next(true).set_tuplet(Some(
            TupletRatio::new(3, 2, NoteType::Eighth)
                .unwrap()
                .with_bracket(Some(TupletBracket::Start)),
        ));
        item.set_beam(1, BeamValue::Begin);
        let xml = item.render_musicxml(&RenderSettings::with_divisions(3), 0).unwrap();
        let expected = r#"<note>
  <pitch>
    <step>C</step>
    <alter>1</alter>
    <octave>4</octave>
  </pitch>
  <duration>1</duration>
  <tie type="start"/>
  <type>eighth</type>
  <accidental>sharp</accidental>
  <time-modification>
    <actual-notes>3</actual-notes>
    <normal-notes>2</normal-notes>
    <normal-type>eighth</normal-type>
  </time-modification>
  <beam number="1">begin</beam>
  <notations>
    <tied type="start"/>
    <tuplet type="start" bracket="yes"/>
  </notations>
</note>
<note>
  <chord/>
  <pitch>
    <step>E</step>
    <octave>4</octave>
  </pitch>
  <duration>1</duration>
  <tie type="start"/>
  <type>eighth</type>
  <time-modification>
    <actual-notes>3</actual-notes>
    <normal-notes>2</normal-notes>
    <normal-type>eighth</normal-type>
  </time-modification>
  <notations>
    <tied type="start"/>
  </notations>
</note>
"#;
        assert_eq!(xml, expected);
        assert!(matches!(
            item.render_musicxml(&RenderSettings::with_divisions(4), 0),
            Err(RhythmicError::InvalidDuration(_))
        ));
    }

    #[test]
    fn voice() {
        let mut voice = Voice::new(TimeSignature::new(2, 4)).unwrap();
        let g = Pitch::new(Step::G, 0, 4);
        for _ in 0..3 {
            voice
                .push(RhythmicItem::pitched(vec![g], dur(1, 3)).unwrap())
                .unwrap();
        }
        voice
            .push(RhythmicItem::grace(vec![Pitch::new(Step::A, 0, 4)]).unwrap())
            .unwrap();
        voice.push(RhythmicItem::rest(dur(1, 1)).unwrap()).unwrap();
        assert_eq!(divisions(&voice), 3);
        let unfinalized = voice.render_musicxml(&RenderSettings::default(), 0);
        assert!(matches!(
            unfinalized.map_err(|e| e.root().clone()),
            Err(RhythmicError::ChordTypeNotSet { index: 0 })
        ));
        voice.finalize(RhythmicConfig::builtin()).unwrap();
        let xml = to_musicxml(&voice, &RenderSettings::default()).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<divisions>3</divisions>"));
        assert!(xml.contains("<beats>2</beats>"));
        assert!(xml.contains("<grace/>"));
        assert!(xml.contains("<rest/>"));
        assert_eq!(xml.matches("<note>").count(), 5);
        assert_eq!(xml.matches(r#"<beam number="1">"#).count(), 3);
        assert_eq!(xml.matches("<measure ").count(), 1);
        assert!(xml.trim_end().ends_with("</score-partwise>"));
    }
}
