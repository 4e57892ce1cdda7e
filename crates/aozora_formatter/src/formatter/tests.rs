use super::*;

const HEADER: &str = "吾輩は猫である
夏目漱石

-------------------------------------------------------
【テキスト中に現れる記号について】

《》：ルビ
（例）吾輩《わがはい》
-------------------------------------------------------
";

#[test]
fn test_plain_text_is_identity() {
    let text = "吾輩は猫である。\n　名前はまだ無い。\n\nどこで生れたかとんと見当がつかぬ。";
    assert_eq!(format(text).unwrap(), text);
}

#[test]
fn test_ruby_is_left_for_resegmentation() {
    let text = "吾輩《わがはい》は猫である。\n";
    assert_eq!(format(text).unwrap(), text);
}

#[test]
fn test_header_block_is_skipped() {
    let text = format!("{}本文\n", HEADER);
    assert_eq!(format(&text).unwrap(), "吾輩は猫である\n夏目漱石\n\n本文\n");
}

#[test]
fn test_unclosed_separator_drops_only_itself() {
    let text = "前\n----------\n後\n";
    assert_eq!(format(text).unwrap(), "前\n後\n");
}

#[test]
fn test_colophon_ends_output() {
    let text = "本文\n\n底本：「夏目漱石全集1」ちくま文庫\n入力：小林繁雄\n";
    let out = format(text).unwrap();
    assert_eq!(out, "本文\n\n");
    assert!(!out.contains("底本"));
    assert!(!out.contains("入力"));
}

#[test]
fn test_block_indent() {
    let text = "［＃ここから３字下げ］\n一行目\n二行目\n［＃ここで字下げ終わり］\n戻った\n";
    assert_eq!(
        format(text).unwrap(),
        "　　　一行目\n　　　二行目\n戻った\n"
    );
}

#[test]
fn test_single_line_indent_is_consumed() {
    let text = "［＃２字下げ］はしがき\n本文\n";
    assert_eq!(format(text).unwrap(), "　　はしがき\n本文\n");
}

#[test]
fn test_single_indent_adds_to_block_indent() {
    let text = "［＃ここから１字下げ］\n［＃２字下げ］深い\n浅い\n";
    assert_eq!(format(text).unwrap(), "　　　深い\n　浅い\n");
}

#[test]
fn test_ground_alignment() {
    let text = "［＃地付き］おわり\n次\n";
    assert_eq!(format(text).unwrap(), "\\f[align,right]おわり\n次\n");
}

#[test]
fn test_ground_block_ends_with_left_alignment() {
    let text = "［＃ここから地付き］\n右\n［＃ここで地付き終わり］\n左\n";
    assert_eq!(
        format(text).unwrap(),
        "\\f[align,right]右\n\\f[align,left]左\n"
    );
}

#[test]
fn test_raise_pads_line_end() {
    let text = "［＃ここから２字上げ］\n上げ\n［＃ここで字上げ終わり］\n戻る\n";
    assert_eq!(format(text).unwrap(), "上げ　　\n戻る\n");

    let text = "署名［＃１字上げ］\n";
    assert_eq!(format(text).unwrap(), "署名　\n");
}

#[test]
fn test_raise_from_ground_trims_leading_padding() {
    // 4 spaces of indent are 12 bytes, more than the 6 bytes to trim.
    let text = "［＃ここから４字下げ］\n［＃地から２字上げ］署名\n";
    assert_eq!(format(text).unwrap(), "　　署名　　\n");
}

#[test]
fn test_raise_from_ground_without_enough_padding_is_untouched() {
    let text = "［＃地から３字上げ］署名\n";
    assert_eq!(format(text).unwrap(), "署名　　　\n");

    let text = "［＃ここから１字下げ］\n［＃地から１字上げ］署名\n";
    assert_eq!(format(text).unwrap(), "　署名　\n");
}

#[test]
fn test_line_state_is_reset() {
    let text = "［＃地から１字上げ］［＃地付き］［＃３字下げ］一\n二\n";
    let out = format(text).unwrap();
    assert!(out.ends_with("\n二\n"));
}

#[test]
fn test_markup_rules_are_applied() {
    let text = "［＃改ページ］\n第一章［＃「第一章」は大見出し］\n猫は猫［＃「猫」は太字］\n";
    assert_eq!(
        format(text).unwrap(),
        "□■\n\\f[bold,on]第一章\\f[bold,off]\n\\f[bold,on]猫\\f[bold,off]は猫\n"
    );
}

#[test]
fn test_indent_applies_around_markup() {
    let text = "［＃ここから２字下げ］\n※［＃「てへん＋劣」、第4水準2-13-28］る\n";
    assert_eq!(format(text).unwrap(), "　　□る\n");
}

#[test]
fn test_invalid_width_aborts() {
    let text = "一行目\n［＃ここから二字下げ］\n三行目\n";
    let err = format(text).unwrap_err();
    assert_eq!(
        err,
        FormatError::InvalidWidth {
            line: 2,
            annotation: "ここから二字下げ".to_string(),
        }
    );
    assert_eq!(
        err.to_string(),
        "line 2: invalid width in annotation ［＃ここから二字下げ］"
    );
}

#[test]
fn test_compose_with_short_padding_does_not_trim() {
    let state = FormatState {
        line_indent: "　".to_string(),
        trailing_pad: 9,
        ..FormatState::default()
    };
    assert_eq!(state.compose("本文", "\n"), "　本文\n");
}

#[test]
fn test_compose_never_splits_a_character() {
    let state = FormatState {
        block_align: "\\f[align,right]".to_string(),
        block_indent: "　".to_string(),
        trailing_pad: 16,
        ..FormatState::default()
    };
    // 15 ASCII bytes then a 3-byte space: byte 16 is inside the space.
    assert_eq!(state.compose("x", ""), "\\f[align,right]　x");
}

#[test]
fn test_state_is_not_shared_between_calls() {
    let formatter = LineFormatter::default();
    formatter.format("［＃ここから３字下げ］\n").unwrap();
    assert_eq!(formatter.format("本文\n").unwrap(), "本文\n");
}

#[test]
fn test_huge_width_is_a_format_error() {
    let text = "前\n［＃地から６１４８９１４６９１２３６５１７２０６字上げ］署名\n";
    let err = format(text).unwrap_err();
    assert!(matches!(err, FormatError::InvalidWidth { line: 2, .. }));
}

#[test]
fn test_widest_raise_from_ground() {
    let mut state = FormatState::default();
    state.apply(LayoutCommand::RaiseFromGround(command::MAX_WIDTH));
    assert_eq!(state.trailing_pad, command::MAX_WIDTH * FULL_WIDTH_BYTES);
    assert_eq!(state.line_raise.chars().count(), command::MAX_WIDTH);
}

#[test]
fn test_block_end_inside_a_line_keeps_the_block() {
    let text = "［＃ここから２字下げ］\n一［＃ここで字下げ終わり］\n二\n［＃ここで字下げ終わり］\n三\n";
    assert_eq!(
        format(text).unwrap(),
        "　　一［＃ここで字下げ終わり］\n　　二\n三\n"
    );
}

#[test]
fn test_heading_after_page_break_keeps_sentinel_first() {
    let text = "［＃改ページ］第一章［＃「第一章」は大見出し］\n";
    assert_eq!(
        format(text).unwrap(),
        "□■\\f[bold,on]第一章\\f[bold,off]\n"
    );
}
