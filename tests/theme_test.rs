use std::collections::HashSet;

use weatherplay::weather::theme::{ThemeTag, classify};

#[test]
fn test_classify_known_buckets() {
    assert_eq!(classify(0), ThemeTag::Sunny);

    for code in [1, 2, 3] {
        assert_eq!(classify(code), ThemeTag::Cloudy, "code {}", code);
    }
    for code in [45, 48] {
        assert_eq!(classify(code), ThemeTag::Foggy, "code {}", code);
    }
    for code in [51, 55, 61, 63, 80] {
        assert_eq!(classify(code), ThemeTag::Rainy, "code {}", code);
    }
    for code in [65, 81, 95] {
        assert_eq!(classify(code), ThemeTag::Stormy, "code {}", code);
    }
    for code in [71, 73, 75] {
        assert_eq!(classify(code), ThemeTag::Snowy, "code {}", code);
    }
}

#[test]
fn test_classify_unknown_codes_are_default() {
    for code in [4, 44, 53, 96, 99, 1000, -1, i64::MIN, i64::MAX] {
        assert_eq!(classify(code), ThemeTag::Default, "code {}", code);
    }
}

#[test]
fn test_classify_is_total_and_closed() {
    let all: HashSet<ThemeTag> = ThemeTag::ALL.into_iter().collect();
    assert_eq!(all.len(), 7);

    for code in -200..=200 {
        assert!(all.contains(&classify(code)));
        // deterministic
        assert_eq!(classify(code), classify(code));
    }
}

#[test]
fn test_theme_names() {
    assert_eq!(ThemeTag::Sunny.to_string(), "sunny");
    assert_eq!(ThemeTag::Stormy.as_str(), "stormy");
    assert_eq!(ThemeTag::Default.to_string(), "default");
}
