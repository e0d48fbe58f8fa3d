mod common;

use assert_fs::prelude::*;
use assert_fs::TempDir;
use common::TestSource;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thumbpick::sources::thumb::PathTemplate;
use thumbpick::sources::{Autotuned, Configured, CostSpec, Ffmpeg, Filtered, Thumb};
use thumbpick::{
    AspectRatioFit, ImageId, Orientation, RequestCtx, Size, Source, Sources, ThumbError,
    ThumbnailConfig,
};

#[test]
fn fit_inside_never_exceeds_target() {
    let target = Size::new(256, 256);
    let fitted = target.fit(Size::new(4000, 3000), AspectRatioFit::FitInside);
    assert!(fitted.width <= 256 && fitted.height <= 256);
    assert_eq!(fitted, Size::new(256, 192));
}

#[test]
fn fit_outside_covers_target() {
    let target = Size::new(256, 256);
    let fitted = target.fit(Size::new(4000, 3000), AspectRatioFit::FitOutside);
    assert!(fitted.width >= 256 && fitted.height >= 256);
    assert_eq!(fitted, Size::new(341, 256));
}

#[test]
fn original_size_ignores_target() {
    let original = Size::new(123, 456);
    assert_eq!(
        Size::new(9, 9).fit(original, AspectRatioFit::OriginalSize),
        original
    );
}

#[test]
fn configured_estimate_combines_cost_components() {
    let spec = CostSpec {
        time: Duration::from_millis(15),
        time_per_original_megapixel: Duration::from_millis(10),
        time_per_resized_megapixel: Duration::from_millis(20),
    };
    // 1 MP original, 0.25 MP resized output.
    let estimate = spec.estimate(Size::new(1000, 1000), Size::new(500, 500));
    assert_eq!(estimate, Duration::from_millis(30));
}

#[test]
fn configured_renames_and_forwards() {
    let inner = Arc::new(TestSource::new("raw", Size::new(64, 64)));
    let configured = Configured::new("my-source", CostSpec::default(), inner);
    assert_eq!(configured.name(), "my-source");
    assert_eq!(configured.size(Size::new(1000, 1000)), Size::new(64, 64));

    let unnamed = Configured::new(
        "",
        CostSpec::default(),
        Arc::new(TestSource::new("raw", Size::new(64, 64))),
    );
    assert_eq!(unnamed.name(), "raw");
}

#[test]
fn autotuned_trusts_the_model_only_after_warmup() {
    let spec = CostSpec {
        time: Duration::from_millis(123),
        ..CostSpec::default()
    };
    let inner = Arc::new(TestSource::new("fast", Size::new(64, 64)));
    let configured = Arc::new(Configured::new("fast", spec, inner));
    let autotuned = Autotuned::new(Arc::clone(&configured));

    let original = Size::new(1000, 1000);
    let static_estimate = configured.duration_estimate(original);
    let ctx = RequestCtx::new();
    let path = PathBuf::from("photo.jpg");

    // Below the warm-up threshold the configured estimate is returned
    // verbatim.
    for _ in 0..5 {
        autotuned.get(&ctx, ImageId(1), &path, original).unwrap();
        assert_eq!(autotuned.duration_estimate(original), static_estimate);
    }

    // The sixth sample switches over to the learned model. The wrapped
    // source returns instantly, so the learned latency sits far below
    // the configured 123ms.
    autotuned.get(&ctx, ImageId(1), &path, original).unwrap();
    let learned = autotuned.duration_estimate(original);
    assert_ne!(learned, static_estimate);
    assert!(learned < static_estimate);
}

#[test]
fn autotuned_ignores_failed_attempts() {
    let spec = CostSpec {
        time: Duration::from_millis(50),
        ..CostSpec::default()
    };
    let inner = Arc::new(
        TestSource::new("broken", Size::new(64, 64))
            .failing(ThumbError::MissingBinary { tool: "ffmpeg" }),
    );
    let configured = Arc::new(Configured::new("broken", spec, inner));
    let autotuned = Autotuned::new(Arc::clone(&configured));

    let original = Size::new(1000, 1000);
    let ctx = RequestCtx::new();
    let path = PathBuf::from("photo.jpg");
    for _ in 0..10 {
        let _ = autotuned.get(&ctx, ImageId(1), &path, original);
    }

    // Nothing was learned, so the static estimate still applies.
    assert_eq!(
        autotuned.duration_estimate(original),
        configured.duration_estimate(original)
    );
}

#[test]
fn filtered_rejects_other_extensions() {
    let inner = Arc::new(TestSource::new("inner", Size::new(64, 64)));
    let filtered = Filtered::new(inner.clone(), vec!["jpg".to_string(), ".jpeg".to_string()]);
    let ctx = RequestCtx::new();

    assert!(filtered.exists(&ctx, ImageId(1), Path::new("photo.JPG")));
    assert!(!filtered.exists(&ctx, ImageId(1), Path::new("clip.mp4")));

    let err = filtered
        .get(&ctx, ImageId(1), Path::new("clip.mp4"), Size::default())
        .unwrap_err();
    assert_eq!(err, ThumbError::UnsupportedExtension);
    assert_eq!(inner.call_count(), 0);

    filtered
        .get(&ctx, ImageId(1), Path::new("photo.jpg"), Size::default())
        .unwrap();
    assert_eq!(inner.call_count(), 1);
}

#[test]
fn path_template_validates_placeholders() {
    assert!(PathTemplate::parse("{dir}/thumbs/{filename}.jpg").is_ok());
    assert!(PathTemplate::parse("{dir}/{bogus}.jpg").is_err());
    assert!(PathTemplate::parse("{dir/file.jpg").is_err());
    assert!(PathTemplate::parse("dir}/file.jpg").is_err());
}

#[test]
fn path_template_resolves_against_original() {
    let template = PathTemplate::parse("{dir}/thumbs/{filename}.jpg").unwrap();
    let resolved = template.resolve(Path::new("/photos/2024/cat.cr2"));
    assert_eq!(resolved, PathBuf::from("/photos/2024/thumbs/cat.cr2.jpg"));
}

#[test]
fn thumb_source_decodes_pregenerated_files() {
    let temp = TempDir::new().unwrap();
    temp.child("thumbs").create_dir_all().unwrap();
    let original = temp.child("cat.jpg");
    original.touch().unwrap();

    let pregenerated = temp.child("thumbs/cat.jpg.png");
    let img = image::RgbaImage::from_pixel(16, 12, image::Rgba([1, 2, 3, 255]));
    img.save(pregenerated.path()).unwrap();

    let thumb = Thumb::new(
        "pregen",
        "{dir}/thumbs/{filename}.png",
        AspectRatioFit::FitInside,
        16,
        12,
    )
    .unwrap();

    let ctx = RequestCtx::new();
    assert!(thumb.exists(&ctx, ImageId(1), original.path()));
    assert!(!thumb.exists(&ctx, ImageId(2), temp.child("dog.jpg").path()));

    let result = thumb
        .get(&ctx, ImageId(1), original.path(), Size::default())
        .unwrap();
    assert_eq!(result.image.width(), 16);
    assert_eq!(result.image.height(), 12);
    // Pregenerated files come back already rotated.
    assert_eq!(result.orientation, Orientation::Normal);
}

#[test]
fn missing_binary_still_satisfies_the_contract() {
    let ffmpeg = Ffmpeg::new(256, 256, AspectRatioFit::FitInside).with_binary(None);

    // The absence shows up in the name but leaves the estimates usable,
    // so ranking still works on machines without the tool.
    assert!(ffmpeg.name().ends_with(" (N/A)"));
    let original = Size::new(4000, 3000);
    assert_eq!(ffmpeg.size(original), Size::new(256, 192));
    assert!(ffmpeg.duration_estimate(original) > Duration::ZERO);

    let sources = Sources::new(vec![Arc::new(
        Ffmpeg::new(256, 256, AspectRatioFit::FitInside).with_binary(None),
    )]);
    let costs = sources.estimate_cost(original, Size::new(256, 256));
    assert_eq!(costs.len(), 1);

    // Only an actual generation attempt reports the missing tool.
    let ctx = RequestCtx::new();
    let err = ffmpeg
        .get(&ctx, ImageId(1), Path::new("clip.mp4"), original)
        .unwrap_err();
    assert_eq!(err, ThumbError::MissingBinary { tool: "ffmpeg" });
}

#[test]
fn thumb_ext_follows_the_template() {
    let thumb = Thumb::new(
        "pregen",
        "{dir}/thumbs/{filename}.png",
        AspectRatioFit::FitInside,
        16,
        12,
    )
    .unwrap();
    assert_eq!(thumb.ext(), ".png");
}

#[test]
fn read_decoder_is_an_opt_in_capability() {
    let inner = Arc::new(TestSource::new("plain", Size::new(64, 64)));
    let err = inner.read_decoder().err().unwrap();
    assert_eq!(
        err,
        ThumbError::UnsupportedCapability {
            capability: "reader",
            source_name: "plain".to_string(),
        }
    );

    // Decorators keep the capability visible through the chain.
    let configured = Configured::new("plain", CostSpec::default(), inner);
    assert!(configured.as_read_decoder().is_none());
}

#[test]
fn config_parses_durations_and_builds_the_chain() {
    let json = r#"{
        "sources": [
            {
                "name": "video-thumbs",
                "type": "FFMPEG",
                "width": 256,
                "height": 256,
                "fit": "INSIDE",
                "extensions": ["mp4", "mkv"],
                "cost": {
                    "time": "550ms",
                    "time_per_original_megapixel": "15ms",
                    "time_per_resized_megapixel": "1ms"
                }
            },
            {
                "name": "embedded",
                "type": "EXIFTOOL",
                "cost": { "time": "17ms" }
            }
        ]
    }"#;

    let config = ThumbnailConfig::from_json(json).unwrap();
    assert_eq!(config.sources.len(), 2);
    assert_eq!(config.sources[0].fit, AspectRatioFit::FitInside);
    assert_eq!(config.sources[0].cost.time, Duration::from_millis(550));
    assert_eq!(config.sources[1].cost.time, Duration::from_millis(17));

    let sources = config.build_sources().unwrap();
    assert_eq!(sources.len(), 2);
    // The dedup layer sits at the top of every chain.
    assert!(sources.iter().next().unwrap().name().ends_with("(dedup)"));

    // Configured estimates flow through the whole chain.
    let estimate = sources
        .iter()
        .nth(1)
        .unwrap()
        .duration_estimate(Size::new(1000, 1000));
    assert_eq!(estimate, Duration::from_millis(17));
}

#[test]
fn config_rejects_bad_scale_and_missing_template() {
    let bad_scale = r#"{
        "sources": [
            { "type": "DJPEG", "width": 256, "height": 256, "scale": "3/4" }
        ]
    }"#;
    let config = ThumbnailConfig::from_json(bad_scale).unwrap();
    assert!(matches!(
        config.build_sources(),
        Err(ThumbError::InvalidConfig(_))
    ));

    let missing_path = r#"{ "sources": [ { "type": "THUMB" } ] }"#;
    let config = ThumbnailConfig::from_json(missing_path).unwrap();
    assert!(matches!(
        config.build_sources(),
        Err(ThumbError::InvalidConfig(_))
    ));
}

#[test]
fn unknown_fit_falls_back_to_original_size() {
    let json = r#"{
        "sources": [ { "type": "FFMPEG", "fit": "SIDEWAYS" } ]
    }"#;
    let config = ThumbnailConfig::from_json(json).unwrap();
    assert_eq!(config.sources[0].fit, AspectRatioFit::OriginalSize);
}
