use ngi_assets::{
    AssetStore, Derived, DerivedFormatBackend, DerivedHandle, ImageBackend, ManipulationOwner, Manipulated, MaterializeError,
    NextGenConfig, Visibility, WriteConfig,
};
use ngi_fileid::{
    AddressingScheme, DerivedFormat, DerivedFormatResolution, FileIdHelperResolutionStrategy, FileTuple,
    TupleResolution,
};
use ngi_test_utils::{FakeImageBackend, Fixture, MemoryStore, StoredImage};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;

fn store_webp(store: &dyn AssetStore, target: &FileTuple) -> Result<Option<Manipulated>, MaterializeError> {
    let tuple = store.set_from_string(
        b"webp:1x1",
        target.filename(),
        target.hash(),
        target.variant(),
        &WriteConfig::use_existing(Visibility::Public),
    )?;
    Ok(Some(Manipulated::new(tuple)))
}

fn short(hash: &str) -> &str {
    &hash[..10]
}

#[test]
fn test_materialize_twice_calls_back_once() {
    let fx = Fixture::default();
    let mut image = fx.upload("folder/wbg-logo.png", 200, 100);
    let calls = AtomicUsize::new(0);

    let first = fx
        .materializer
        .materialize(&mut image, "", |_, store, target| {
            calls.fetch_add(1, Ordering::SeqCst);
            store_webp(store, target)
        })
        .unwrap()
        .unwrap();
    let second = fx
        .materializer
        .materialize(&mut image, "", |_, store, target| {
            calls.fetch_add(1, Ordering::SeqCst);
            store_webp(store, target)
        })
        .unwrap()
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.file_tuple(), second.file_tuple());
    assert_eq!(first.filename(), "folder/wbg-logo.png.webp");
    assert_eq!(first.hash(), image.hash());
    assert_eq!(
        first.tuple().file_id(),
        format!("folder/{}/wbg-logo.png.webp", short(image.hash()))
    );
    assert_eq!(first.original(), Some(&image.file_tuple()));
}

#[test]
fn test_generation_disabled_returns_none() {
    let fx = Fixture::default();
    let mut image = fx.upload("folder/wbg-logo.png", 200, 100).with_allow_generation(false);
    let calls = AtomicUsize::new(0);

    let handle = fx
        .materializer
        .materialize(&mut image, "", |_, store, target| {
            calls.fetch_add(1, Ordering::SeqCst);
            store_webp(store, target)
        })
        .unwrap();

    assert!(handle.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_generation_disabled_still_finds_stored_variant() {
    let fx = Fixture::default();
    let mut image = fx.upload("folder/wbg-logo.png", 200, 100);
    fx.materializer.derived_format(&mut image).unwrap().unwrap();

    let mut locked = image.clone().with_allow_generation(false);
    let handle = fx.materializer.derived_format(&mut locked).unwrap().unwrap();
    assert_eq!(handle.file_tuple().filename(), "folder/wbg-logo.png.webp");

    let handle = match handle {
        Derived::Generated(handle) => handle,
        Derived::Original(_) => panic!("png owner returned as derived"),
    };
    assert!(!handle.allow_generation());
}

#[test]
fn test_missing_owner_is_not_applicable() {
    let fx = Fixture::default();
    let mut image = StoredImage::missing("folder/gone.png");
    assert!(fx.materializer.derived_format(&mut image).unwrap().is_none());
    assert!(fx.materializer.scale_width(&mut image, 100).unwrap().is_none());
}

#[test]
fn test_derived_owner_returned_unchanged() {
    let fx = Fixture::default();
    let mut image = fx.upload("folder/photo.webp", 64, 64);
    let writes = fx.store.write_count();

    match fx.materializer.derived_format(&mut image).unwrap() {
        Some(Derived::Original(owner)) => {
            assert_eq!(owner.filename(), "folder/photo.webp");
            assert!(owner.variant().is_empty());
        }
        other => panic!("expected the owner itself, got {other:?}"),
    }
    assert_eq!(fx.store.write_count(), writes);
}

#[test]
fn test_derived_format_encodes_once() {
    let fx = Fixture::default();
    let mut image = fx.upload("folder/wbg-logo.png", 200, 100);
    let backend = image.backend().cloned().unwrap();
    let hash = image.hash().to_string();

    let derived = fx.materializer.derived_format(&mut image).unwrap().unwrap();
    assert_eq!(derived.file_tuple().filename(), "folder/wbg-logo.png.webp");
    assert_eq!(
        fx.store.read("folder/wbg-logo.png.webp", &hash, ""),
        Some(b"webp:200x100".to_vec())
    );

    fx.materializer.derived_format(&mut image).unwrap().unwrap();
    assert_eq!(backend.encode_count(), 1);
    assert_eq!(fx.loader.load_count(), 0);
}

#[test]
fn test_declined_encode_stores_nothing() {
    let fx = Fixture::default();
    let image = fx.upload("folder/anim.gif", 10, 10);
    let backend = image.backend().cloned().unwrap().declining("webp");
    let mut image = image.with_backend(Some(backend));

    assert!(fx.materializer.derived_format(&mut image).unwrap().is_none());
    assert!(!fx.store.exists("folder/anim.gif.webp", image.hash(), ""));
}

#[test]
fn test_encoder_uses_configured_quality() {
    let fx = Fixture::new(&NextGenConfig::new().with_quality(55));
    let image = fx.upload("folder/wbg-logo.png", 200, 100);
    let backend = image.backend().cloned().unwrap().encoding_to_backend();
    let mut image = image.with_backend(Some(backend));

    let derived = fx.materializer.derived_format(&mut image).unwrap().unwrap();
    let Derived::Generated(handle) = derived else {
        panic!("png owner returned as derived");
    };
    let live = handle.backend().unwrap();
    assert_eq!(live.quality(), 55);
    assert_eq!(live.dimensions(), Some((200, 100)));
}

#[test]
fn test_callback_writing_other_key_is_fatal() {
    let fx = Fixture::default();
    let mut image = fx.upload("folder/wbg-logo.png", 200, 100);

    let err = fx
        .materializer
        .materialize(&mut image, "", |_, store, target| {
            let tuple = store.set_from_string(
                b"webp:1x1",
                "folder/elsewhere.png.webp",
                target.hash(),
                target.variant(),
                &WriteConfig::default(),
            )?;
            Ok(Some(Manipulated::new(tuple)))
        })
        .unwrap_err();
    assert!(matches!(err, MaterializeError::ContractViolation(_)));
}

#[test]
fn test_chained_transforms_converge() {
    let variant = "ScaleWidthWzEwMF0";

    // scale, then derive
    let scaled_first = Fixture::default();
    let mut image = scaled_first.upload("folder/wbg-logo.png", 200, 100);
    let mut scaled = scaled_first.materializer.scale_width(&mut image, 100).unwrap().unwrap();
    assert_eq!(scaled.variant(), variant);
    assert_eq!(scaled.dimensions(), Some((100, 50)));
    let derived = scaled_first.materializer.derived_format(&mut scaled).unwrap().unwrap();
    assert_eq!(derived.file_tuple(), FileTuple::new("folder/wbg-logo.png.webp", image.hash(), variant));
    assert_eq!(scaled_first.loader.load_count(), 0);

    // derive, then scale
    let derived_first = Fixture::default();
    let mut image = derived_first.upload("folder/wbg-logo.png", 200, 100);
    let Derived::Generated(mut webp) = derived_first.materializer.derived_format(&mut image).unwrap().unwrap()
    else {
        panic!("png owner returned as derived");
    };
    let scaled = derived_first.materializer.scale_width(&mut webp, 100).unwrap().unwrap();
    assert_eq!(scaled.file_tuple(), FileTuple::new("folder/wbg-logo.png.webp", image.hash(), variant));

    let expected_id = format!("folder/{}/wbg-logo__{variant}.png.webp", short(image.hash()));
    assert!(scaled_first.store.file_ids().contains(&expected_id));
    assert!(derived_first.store.file_ids().contains(&expected_id));
    assert_eq!(
        scaled_first.store.read("folder/wbg-logo.png.webp", image.hash(), variant),
        derived_first.store.read("folder/wbg-logo.png.webp", image.hash(), variant),
    );
}

#[test]
fn test_resize_composes_variants() {
    let fx = Fixture::default();
    let mut image = fx.upload("folder/wbg-logo.png", 200, 100);
    let mut scaled = fx.materializer.scale_width(&mut image, 100).unwrap().unwrap();
    let resized = fx.materializer.resize(&mut scaled, 40, 40).unwrap().unwrap();

    assert_eq!(resized.variant(), "ScaleWidthWzEwMF0_ResizedImageWzQwLDQwXQ");
    assert_eq!(resized.dimensions(), Some((40, 40)));
    assert_eq!(resized.original(), Some(&scaled.file_tuple()));
}

#[test]
fn test_concurrent_materialization_converges() {
    let fx = Fixture::default();
    let image = fx.upload("folder/wbg-logo.png", 200, 100);
    let barrier = Barrier::new(4);

    let tuples: Vec<FileTuple> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let mut owner = image.clone();
                let materializer = &fx.materializer;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    let derived = materializer.derived_format(&mut owner).unwrap().unwrap();
                    derived.file_tuple()
                })
            })
            .collect();
        workers.into_iter().map(|worker| worker.join().unwrap()).collect()
    });

    assert!(tuples.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(fx.store.write_count(), 2);
    assert_eq!(fx.store.file_ids().len(), 2);
}

#[test]
fn test_natural_scheme_layout() {
    let fx = Fixture::new(&NextGenConfig::new().with_addressing(AddressingScheme::Natural));
    let mut image = fx.upload("images/wbg-logo.png", 200, 100);
    let mut scaled = fx.materializer.scale_width(&mut image, 100).unwrap().unwrap();
    fx.materializer.derived_format(&mut scaled).unwrap().unwrap();

    assert_eq!(
        fx.store.file_ids(),
        vec![
            "images/wbg-logo.png".to_string(),
            "images/wbg-logo__ScaleWidthWzEwMF0.png".to_string(),
            "images/wbg-logo__ScaleWidthWzEwMF0.png.webp".to_string(),
        ]
    );
}

#[test]
fn test_write_through_backend_stores_sibling() {
    let store = MemoryStore::default();
    let mut backend = DerivedFormatBackend::new(FakeImageBackend::new(40, 20, "png"), DerivedFormat::webp());

    let tuple = backend
        .write_to_store(&store, "folder/pic.png", "", "", &WriteConfig::default())
        .unwrap();

    assert_eq!(store.read("folder/pic.png", tuple.hash(), ""), Some(b"png:40x20".to_vec()));
    assert_eq!(store.read("folder/pic.png.webp", tuple.hash(), ""), Some(b"webp:40x20".to_vec()));
    assert_eq!(backend.inner().encode_count(), 1);
}

#[test]
fn test_write_through_survives_transforms() {
    let fx = Fixture::default();
    let image = fx.upload("folder/wbg-logo.png", 200, 100);
    let hash = image.hash().to_string();
    let inner = image.backend().cloned().unwrap();
    let mut owner = DerivedHandle::new(image.file_tuple())
        .with_backend(Box::new(DerivedFormatBackend::new(inner, DerivedFormat::webp())));

    let mut scaled = fx.materializer.scale_width(&mut owner, 100).unwrap().unwrap();
    assert_eq!(
        fx.store.read("folder/wbg-logo.png", &hash, "ScaleWidthWzEwMF0"),
        Some(b"png:100x50".to_vec())
    );
    assert_eq!(
        fx.store.read("folder/wbg-logo.png.webp", &hash, "ScaleWidthWzEwMF0"),
        Some(b"webp:100x50".to_vec())
    );

    fx.materializer.resize(&mut scaled, 40, 40).unwrap().unwrap();
    assert_eq!(
        fx.store.read("folder/wbg-logo.png.webp", &hash, "ScaleWidthWzEwMF0_ResizedImageWzQwLDQwXQ"),
        Some(b"webp:40x40".to_vec())
    );
}

#[test]
fn test_write_through_skips_declined_sibling() {
    let store = MemoryStore::default();
    let inner = FakeImageBackend::new(40, 20, "gif").declining("webp");
    let mut backend = DerivedFormatBackend::new(inner, DerivedFormat::webp());

    let tuple = backend
        .write_to_store(&store, "folder/anim.gif", "", "", &WriteConfig::default())
        .unwrap();

    assert!(store.exists("folder/anim.gif", tuple.hash(), ""));
    assert!(!store.exists("folder/anim.gif.webp", tuple.hash(), ""));
}

#[test]
fn test_visibility_moves_with_derived_copies() {
    let fx = Fixture::default();
    let mut image =
        StoredImage::upload_with_visibility(&fx.store, "folder/wbg-logo.png", 200, 100, Visibility::Protected);
    fx.materializer.derived_format(&mut image).unwrap().unwrap();
    fx.materializer.scale_width(&mut image, 100).unwrap().unwrap();

    let resolver = DerivedFormatResolution::new(
        FileIdHelperResolutionStrategy::single(AddressingScheme::Hash.helper()),
        DerivedFormat::webp(),
    );
    let changed = fx.store.set_visibility(image.tuple(), &resolver, Visibility::Public);

    assert_eq!(changed, 3);
    for file_id in fx.store.file_ids() {
        let parsed = resolver.parse_file_id(&file_id);
        assert!(parsed.is_some(), "unparseable {file_id}");
    }
}
