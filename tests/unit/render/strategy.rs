use super::*;
use crate::layout::plan::{Drawable, TextRole};

fn meta() -> PageMetadata {
    PageMetadata {
        title: Some("Hello World".to_string()),
        clean_title: Some("Hello World".to_string()),
        description: Some("A post".to_string()),
        ..PageMetadata::default()
    }
}

fn ctx<'a>(fonts: &'a FontBook, canvas: Canvas) -> CardContext<'a> {
    CardContext {
        background: None,
        canvas,
        fixed_text: "example.com",
        fonts,
        font_family: None,
        jpeg_quality: 80,
    }
}

#[test]
fn builtins_are_registered_by_name() {
    let reg = RendererRegistry::with_builtins();
    assert_eq!(reg.names().collect::<Vec<_>>(), vec!["default", "plain"]);
    assert!(reg.get(DEFAULT_RENDERER).is_ok());
    assert!(reg.get("plain").is_ok());
}

#[test]
fn unknown_renderer_is_a_validation_error() {
    let err = RendererRegistry::with_builtins().get("fancy").err().unwrap();
    assert!(matches!(err, CardError::Validation(_)));
    assert!(err.to_string().contains("default, plain"));
}

#[test]
fn custom_renderer_can_replace_a_builtin() {
    struct Fixed;
    impl CardRenderer for Fixed {
        fn render(&self, _meta: &PageMetadata, _ctx: &CardContext<'_>) -> CardResult<Vec<u8>> {
            Ok(vec![1, 2, 3])
        }
    }

    let mut reg = RendererRegistry::with_builtins();
    reg.register(DEFAULT_RENDERER, Fixed);
    let fonts = FontBook::default();
    let r = reg.get(DEFAULT_RENDERER).unwrap();
    assert_eq!(r.render(&meta(), &ctx(&fonts, Canvas::CARD)).unwrap(), vec![1, 2, 3]);
    assert!(r.plan(&meta(), &ctx(&fonts, Canvas::CARD)).is_none());
}

#[test]
fn default_renderer_produces_a_card_sized_jpeg() {
    let fonts = FontBook::default();
    let bytes = RendererRegistry::with_builtins()
        .get(DEFAULT_RENDERER)
        .unwrap()
        .render(&meta(), &ctx(&fonts, Canvas::CARD))
        .unwrap();
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (1200, 628));
}

#[test]
fn layout_renderer_exposes_its_plan() {
    let fonts = FontBook::default();
    let plan = LayoutRenderer::new(DefaultLayout)
        .plan(&meta(), &ctx(&fonts, Canvas::CARD))
        .unwrap();
    assert!(plan.image().is_none());
    assert_eq!(plan.text(TextRole::Title).unwrap().text, "Hello World");
    assert!(matches!(plan.items.first(), Some(Drawable::Rect(_))));
}
