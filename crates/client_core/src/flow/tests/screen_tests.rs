use super::*;
use crate::catalog::find_template;

#[test]
fn every_route_resolves_to_its_screen() {
    for screen in Screen::ALL {
        assert_eq!(Screen::from_path(screen.path()), Some(screen), "{screen}");
    }
}

#[test]
fn aliases_queries_and_trailing_slashes() {
    assert_eq!(Screen::from_path("/"), Some(Screen::Welcome));
    assert_eq!(Screen::from_path(""), Some(Screen::Welcome));
    assert_eq!(Screen::from_path("/ai-regenerate"), Some(Screen::AiGenerate));
    assert_eq!(Screen::from_path("/covershot"), Some(Screen::CoverShoot));
    assert_eq!(
        Screen::from_path("/?session=abc&qr=true"),
        Some(Screen::Welcome)
    );
    assert_eq!(Screen::from_path("/payment/"), Some(Screen::Payment));
    assert_eq!(Screen::from_path("/ready-to-pay"), None);
}

#[test]
fn template_routing() {
    let classic = find_template("classic").expect("classic");
    let four = find_template("4-in-1").expect("4-in-1");
    let film = find_template("film-strip-3").expect("film strip");
    assert_eq!(Screen::after_template(&classic), Screen::PhonePreview);
    assert_eq!(Screen::after_template(&four), Screen::MultiImageUpload);
    assert_eq!(Screen::after_template(&film), Screen::FilmStrip);

    let glitch = find_template("glitch-pro").expect("glitch");
    let footy = find_template("footy-fan").expect("footy");
    assert_eq!(Screen::after_preview(Some(&glitch)), Screen::Glitch);
    assert_eq!(Screen::after_preview(Some(&footy)), Screen::FootyFan);
    assert_eq!(Screen::after_preview(Some(&classic)), Screen::TextInput);
    assert_eq!(Screen::after_preview(None), Screen::TextInput);
}

#[test]
fn editors_carry_their_transform_range() {
    assert_eq!(
        Screen::PhonePreview.transform_range(),
        Some(TransformRange::CENTERED)
    );
    assert_eq!(
        Screen::Glitch.transform_range(),
        Some(TransformRange::CENTERED_TIGHT)
    );
    assert_eq!(
        Screen::FilmStripUpload.transform_range(),
        Some(TransformRange::ABSOLUTE)
    );
    assert_eq!(Screen::Payment.transform_range(), None);
}

#[test]
fn brand_screens_round_trip() {
    for brand in Brand::ALL {
        assert_eq!(Screen::model_screen(brand).brand(), Some(brand));
    }
    assert_eq!(Screen::TextInput.brand(), None);
    assert_eq!(Screen::FootyFanStyle.to_string(), "footy-fan-style");
}
