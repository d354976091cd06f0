//! Width measurement and slicing of ANSI-coloured text.

use perch_core::ansi::{
    inject_background, restyle_ranges, slice_to_width, strip_ansi, visible_width, RESET,
};

const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const GREEN_BG: &str = "\x1b[42m";

#[test]
fn escapes_take_no_columns() {
    assert_eq!(visible_width(&format!("{RED}hello{RESET}")), 5);
    assert_eq!(visible_width("\x1b[38;2;10;20;30mx\x1b[0m"), 1);
    assert_eq!(visible_width(""), 0);
}

#[test]
fn tabs_and_wide_characters() {
    assert_eq!(visible_width("\tx"), 5);
    assert_eq!(visible_width("日本"), 4);
    assert_eq!(visible_width("e\u{301}"), 1);
}

#[test]
fn strip_keeps_visible_text_only() {
    assert_eq!(strip_ansi(&format!("{BOLD}{RED}fn{RESET} main")), "fn main");
}

#[test]
fn plain_text_splits_at_width() {
    let slice = slice_to_width("abcdefgh", 3);
    assert_eq!(slice.content, "abc");
    assert_eq!(slice.remainder, "defgh");
    assert!(slice.carry.is_empty());
}

#[test]
fn whole_string_fits() {
    let input = format!("{RED}abc{RESET}");
    let slice = slice_to_width(&input, 10);
    assert_eq!(slice.content, input);
    assert!(slice.remainder.is_empty());
    assert!(slice.carry.is_empty());
}

#[test]
fn open_style_is_closed_and_carried() {
    let input = format!("{RED}abcdef{RESET}");
    let slice = slice_to_width(&input, 4);
    assert_eq!(slice.content, format!("{RED}abcd{RESET}"));
    assert_eq!(slice.remainder, format!("ef{RESET}"));
    assert_eq!(slice.carry, RED);

    let rest = format!("{}{}", slice.carry, slice.remainder);
    assert_eq!(strip_ansi(&rest), "ef");
}

#[test]
fn escapes_after_the_cut_stay_with_the_left_part() {
    let input = format!("ab{RED}cd{RESET}");
    let slice = slice_to_width(&input, 2);
    assert_eq!(strip_ansi(&slice.content), "ab");
    assert!(slice.content.contains(RED));
    assert_eq!(slice.remainder, format!("cd{RESET}"));
    assert_eq!(slice.carry, RED);
}

#[test]
fn wide_character_never_straddles_the_edge() {
    let slice = slice_to_width("a日b", 2);
    assert_eq!(slice.content, "a");
    assert_eq!(slice.remainder, "日b");
}

#[test]
fn oversized_character_is_taken_alone() {
    let slice = slice_to_width("日b", 1);
    assert_eq!(slice.content, "日");
    assert_eq!(slice.remainder, "b");
}

#[test]
fn reset_clears_carry() {
    let input = format!("{RED}ab{RESET}cdef");
    let slice = slice_to_width(&input, 3);
    assert_eq!(strip_ansi(&slice.content), "abc");
    assert!(slice.carry.is_empty());
    assert!(!slice.content.ends_with(&format!("{RESET}{RESET}")));
}

#[test]
fn slicing_preserves_every_visible_character() {
    let input = format!("{BOLD}let{RESET} {RED}value{RESET} = \"日本語\";\t// done");
    let mut rest = input.clone();
    let mut seen = String::new();
    loop {
        let slice = slice_to_width(&rest, 5);
        assert!(visible_width(&slice.content) <= 5);
        seen.push_str(&strip_ansi(&slice.content));
        if slice.remainder.is_empty() {
            break;
        }
        rest = format!("{}{}", slice.carry, slice.remainder);
    }
    assert_eq!(seen, strip_ansi(&input));
}

#[test]
fn background_survives_resets() {
    let out = inject_background(&format!("{RED}a{RESET}b"), GREEN_BG);
    assert_eq!(out, format!("{GREEN_BG}{RED}a{RESET}{GREEN_BG}b"));
    assert_eq!(inject_background("plain", ""), "plain");
}

#[test]
fn restyled_ranges_drop_inner_styles_and_restore_outer_ones() {
    let input = format!("{RED}a<{BOLD}%b%>c{RESET}");
    let out = restyle_ranges(&input, &[1..6], GREEN_BG);
    assert_eq!(strip_ansi(&out), "a<%b%>c");
    assert_eq!(
        out,
        format!("{RED}a{RESET}{GREEN_BG}<%b%>{RESET}{RED}{BOLD}c{RESET}")
    );
    assert_eq!(restyle_ranges("plain", &[], GREEN_BG), "plain");
}
