//! Which size variants apply to which media, and how large they come out.
//!
//! The live pipeline and the backfill sweep both consult this table, so the
//! decision for a (media type, kind) pair is made in exactly one place.

use darkroom_core::{Dimensions, MediaType, SizeVariantKind, VariantSettings};

/// Encoding of a produced variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum VariantFormat {
    /// Encoded as JPEG
    #[display("jpeg")]
    Jpeg,
}

impl VariantFormat {
    /// File extension for derived files.
    pub fn extension(&self) -> &'static str {
        match self {
            VariantFormat::Jpeg => "jpg",
        }
    }
}

/// One row of the variant table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariantCandidate {
    /// Variant kind
    pub kind: SizeVariantKind,
    /// Maximum width, 0 for unbounded
    pub max_width: u32,
    /// Maximum height, 0 for unbounded
    pub max_height: u32,
    /// Double-density rendition
    pub hidpi: bool,
    /// Square center crop instead of proportional scaling
    pub crop: bool,
    /// Output encoding
    pub format: VariantFormat,
}

/// Static mapping from media type to its ordered candidate list.
#[derive(Debug, Clone)]
pub struct VariantSpecTable {
    image: Vec<VariantCandidate>,
    video: Vec<VariantCandidate>,
}

impl VariantSpecTable {
    /// Build the table from configured boxes and 2x switches.
    pub fn new(settings: &VariantSettings) -> Self {
        let candidate = |kind: SizeVariantKind, size: darkroom_core::BoxSize| VariantCandidate {
            kind,
            max_width: size.width,
            max_height: size.height,
            hidpi: kind.is_hidpi(),
            crop: kind.is_thumb(),
            format: VariantFormat::Jpeg,
        };

        let mut image = vec![candidate(SizeVariantKind::Thumb, settings.thumb)];
        if settings.thumb_2x {
            image.push(candidate(SizeVariantKind::Thumb2x, settings.thumb.doubled()));
        }
        image.push(candidate(SizeVariantKind::Small, settings.small));
        if settings.small_2x {
            image.push(candidate(SizeVariantKind::Small2x, settings.small.doubled()));
        }
        image.push(candidate(SizeVariantKind::Medium, settings.medium));

        // Videos get no medium2x; a frame grab does not carry that much detail.
        let video = image.clone();

        if settings.medium_2x {
            image.push(candidate(SizeVariantKind::Medium2x, settings.medium.doubled()));
        }

        Self { image, video }
    }

    /// Candidates for a media type, smallest first. `Original` is not listed.
    pub fn candidates(&self, media_type: MediaType) -> &[VariantCandidate] {
        match media_type {
            MediaType::Image => &self.image,
            MediaType::Video => &self.video,
        }
    }

    /// The candidate for `kind`, if it applies to `media_type`.
    pub fn candidate(
        &self,
        media_type: MediaType,
        kind: SizeVariantKind,
    ) -> Option<&VariantCandidate> {
        self.candidates(media_type)
            .iter()
            .find(|candidate| candidate.kind == kind)
    }

    /// The 1x sibling of a 2x candidate.
    fn base_of(&self, media_type: MediaType, kind: SizeVariantKind) -> Option<&VariantCandidate> {
        let base = match kind {
            SizeVariantKind::Thumb2x => SizeVariantKind::Thumb,
            SizeVariantKind::Small2x => SizeVariantKind::Small,
            SizeVariantKind::Medium2x => SizeVariantKind::Medium,
            _ => return None,
        };
        self.candidate(media_type, base)
    }

    /// The box a candidate produces for an upright source, or `None` to decline.
    ///
    /// Never enlarges. Declines a degenerate box, a scaled box equal to the
    /// source (that is the original), and a 2x box equal to its 1x sibling.
    pub fn target_box(
        &self,
        media_type: MediaType,
        candidate: &VariantCandidate,
        source: Dimensions,
    ) -> Option<Dimensions> {
        if source.is_degenerate() {
            return None;
        }
        let target = fit(candidate, source)?;

        if !candidate.crop && target == source {
            return None;
        }
        if candidate.hidpi
            && let Some(base) = self.base_of(media_type, candidate.kind)
            && fit(base, source) == Some(target)
        {
            return None;
        }
        Some(target)
    }
}

/// Fit a candidate's nominal box into the source without enlarging.
fn fit(candidate: &VariantCandidate, source: Dimensions) -> Option<Dimensions> {
    let target = if candidate.crop {
        let nominal = match (candidate.max_width, candidate.max_height) {
            (0, 0) => return None,
            (0, h) => h,
            (w, 0) => w,
            (w, h) => w.min(h),
        };
        let side = nominal.min(source.shorter_side());
        Dimensions::new(side, side)
    } else {
        let width = f64::from(source.width);
        let height = f64::from(source.height);
        let mut scale: f64 = 1.0;
        if candidate.max_width > 0 {
            scale = scale.min(f64::from(candidate.max_width) / width);
        }
        if candidate.max_height > 0 {
            scale = scale.min(f64::from(candidate.max_height) / height);
        }
        let scaled_width = ((width * scale).round() as u32).min(source.width);
        let scaled_height = ((height * scale).round() as u32).min(source.height);
        Dimensions::new(scaled_width, scaled_height)
    };

    (!target.is_degenerate()).then_some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> VariantSpecTable {
        VariantSpecTable::new(&VariantSettings::default())
    }

    fn boxes(media_type: MediaType, source: Dimensions) -> Vec<(SizeVariantKind, Dimensions)> {
        let table = table();
        table
            .candidates(media_type)
            .iter()
            .filter_map(|c| {
                table
                    .target_box(media_type, c, source)
                    .map(|target| (c.kind, target))
            })
            .collect()
    }

    #[test]
    fn test_large_landscape_photo() {
        let produced = boxes(MediaType::Image, Dimensions::new(6720, 4480));
        assert_eq!(
            produced,
            vec![
                (SizeVariantKind::Thumb, Dimensions::new(200, 200)),
                (SizeVariantKind::Thumb2x, Dimensions::new(400, 400)),
                (SizeVariantKind::Small, Dimensions::new(540, 360)),
                (SizeVariantKind::Small2x, Dimensions::new(1080, 720)),
                (SizeVariantKind::Medium, Dimensions::new(1620, 1080)),
                (SizeVariantKind::Medium2x, Dimensions::new(3240, 2160)),
            ]
        );
    }

    #[test]
    fn test_medium2x_declined_when_it_would_equal_original() {
        let produced = boxes(MediaType::Image, Dimensions::new(2016, 1512));
        assert_eq!(
            produced,
            vec![
                (SizeVariantKind::Thumb, Dimensions::new(200, 200)),
                (SizeVariantKind::Thumb2x, Dimensions::new(400, 400)),
                (SizeVariantKind::Small, Dimensions::new(480, 360)),
                (SizeVariantKind::Small2x, Dimensions::new(960, 720)),
                (SizeVariantKind::Medium, Dimensions::new(1440, 1080)),
            ]
        );
    }

    #[test]
    fn test_rounding() {
        let produced = boxes(MediaType::Image, Dimensions::new(3059, 2083));
        assert!(produced.contains(&(SizeVariantKind::Small, Dimensions::new(529, 360))));
        assert!(produced.contains(&(SizeVariantKind::Small2x, Dimensions::new(1057, 720))));
        assert!(produced.contains(&(SizeVariantKind::Medium, Dimensions::new(1586, 1080))));
        assert!(!produced.iter().any(|(kind, _)| *kind == SizeVariantKind::Medium2x));
    }

    #[test]
    fn test_full_hd_video() {
        let produced = boxes(MediaType::Video, Dimensions::new(1920, 1080));
        assert_eq!(
            produced,
            vec![
                (SizeVariantKind::Thumb, Dimensions::new(200, 200)),
                (SizeVariantKind::Thumb2x, Dimensions::new(400, 400)),
                (SizeVariantKind::Small, Dimensions::new(640, 360)),
                (SizeVariantKind::Small2x, Dimensions::new(1280, 720)),
            ]
        );
        assert!(
            table()
                .candidate(MediaType::Video, SizeVariantKind::Medium2x)
                .is_none()
        );
    }

    #[test]
    fn test_never_enlarges() {
        let table = table();
        let source = Dimensions::new(480, 360);
        for candidate in table.candidates(MediaType::Image) {
            if let Some(target) = table.target_box(MediaType::Image, candidate, source) {
                assert!(target.width <= source.width && target.height <= source.height);
            }
        }
    }

    #[test]
    fn test_tiny_source_keeps_single_density_thumb() {
        let produced = boxes(MediaType::Image, Dimensions::new(150, 100));
        assert_eq!(
            produced,
            vec![(SizeVariantKind::Thumb, Dimensions::new(100, 100))]
        );
    }

    #[test]
    fn test_unknown_dimensions_decline() {
        let table = table();
        for candidate in table.candidates(MediaType::Image) {
            assert_eq!(
                table.target_box(MediaType::Image, candidate, Dimensions::new(0, 0)),
                None
            );
        }
    }

    #[test]
    fn test_disabled_2x_is_not_a_candidate() {
        let settings = VariantSettings {
            thumb_2x: false,
            medium_2x: false,
            ..VariantSettings::default()
        };
        let table = VariantSpecTable::new(&settings);
        assert!(table.candidate(MediaType::Image, SizeVariantKind::Thumb2x).is_none());
        assert!(table.candidate(MediaType::Image, SizeVariantKind::Medium2x).is_none());
        assert!(table.candidate(MediaType::Image, SizeVariantKind::Small2x).is_some());
    }

    #[test]
    fn test_candidate_flags_follow_kind() {
        let table = table();
        for candidate in table.candidates(MediaType::Image) {
            assert_eq!(candidate.crop, candidate.kind.is_thumb(), "{}", candidate.kind);
            assert_eq!(candidate.hidpi, candidate.kind.is_hidpi(), "{}", candidate.kind);
            assert_eq!(candidate.format.extension(), "jpg");
        }
        let thumb2x = table
            .candidate(MediaType::Image, SizeVariantKind::Thumb2x)
            .copied();
        assert!(thumb2x.is_some_and(|c| c.crop && c.hidpi));
        assert!(table.candidate(MediaType::Video, SizeVariantKind::Medium2x).is_none());
    }
}
