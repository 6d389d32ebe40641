use super::*;
use crate::foundation::color::Color;

#[test]
fn group_setters_reach_every_descendant() {
    let leaf = || Pen::from_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
    let g = Pen::group([leaf(), Pen::group([leaf()])]).f(Color::WHITE);

    let white = Fill::Solid(Color::WHITE);
    assert_eq!(g.style(None).fill(), Some(&white));
    assert_eq!(g.children()[0].style(None).fill(), Some(&white));
    assert_eq!(
        g.children()[1].children()[0].style(None).fill(),
        Some(&white)
    );
}

#[test]
fn children_appended_later_keep_their_own_style() {
    let mut g = Pen::new().f(Color::WHITE);
    g.append(Pen::from_rect(Rect::new(0.0, 0.0, 1.0, 1.0)))
        .unwrap();
    assert_eq!(g.children()[0].style(None).fill(), None);
}

#[test]
fn named_layers_resolve_independently() {
    let p = Pen::from_rect(Rect::new(0.0, 0.0, 1.0, 1.0))
        .f(Color::BLACK)
        .attr(
            "print",
            Attr::Fill {
                fill: Some(Color::WHITE.into()),
            },
        );
    assert_eq!(
        p.style(Some("print")).fill(),
        Some(&Fill::Solid(Color::WHITE))
    );
    assert_eq!(p.style(None).fill(), Some(&Fill::Solid(Color::BLACK)));
}

#[test]
fn stroke_shorthands_share_a_record() {
    let p = Pen::new()
        .ssw(Color::BLACK, 2.0)
        .dash(vec![3.0, 1.0], 0.5)
        .no_fill()
        .blend(BlendMode::Screen);
    let st = p.style(None);
    let stroke = st.stroke().unwrap();
    assert_eq!(stroke.weight, 2.0);
    assert_eq!(stroke.dash.as_ref().map(|d| d.offset), Some(0.5));
    assert_eq!(st.fill(), None);
    assert_eq!(st.blend(), BlendMode::Screen);
}

#[test]
fn alpha_and_blur_live_in_data() {
    let p = Pen::new().alpha(0.5).blur(9.0);
    assert_eq!(p.data_get(keys::ALPHA).and_then(|v| v.as_f64()), Some(0.5));
    assert_eq!(p.data_get(keys::BLUR).and_then(|v| v.as_f64()), Some(9.0));
}
