
use pretty_assertions::assert_eq;
use tape_prompt::core::output::encode;
use tape_prompt::{
    parse_key_events, DiffRenderer, Frame, KeyEvent, MemoryClipboard, MemoryTerminal, Prompt,
    Viewport,
};
use tokio::sync::mpsc;

async fn session_output(terminal: MemoryTerminal, input: &str) -> String {
    let mut prompt = Prompt::new(terminal, MemoryClipboard::new());
    let events: Vec<KeyEvent> = parse_key_events(input);
    let (tx, mut rx) = mpsc::channel(events.len().max(1));
    for event in events {
        tx.send(event).await.expect("send");
    }
    drop(tx);
    prompt.read_line(&mut rx, None).await.expect("result");
    prompt.terminal_mut().take_output()
}

fn viewport(width: usize, height: usize) -> Viewport {
    Viewport {
        width,
        height,
        window_top: 0,
    }
}

fn frame(lines: &[&str]) -> Frame {
    Frame::from(lines.iter().map(|line| line.to_string()).collect::<Vec<_>>())
}

#[tokio::test]
async fn golden_grow_and_shrink() {
    // Type, Shift+Enter, Backspace, Enter.
    let expected = fixture::read_unescaped("prompt_grow_and_shrink.txt");
    let output = session_output(MemoryTerminal::new(20, 5), "a\x1b[13;2u\x7f\r").await;
    assert_eq!(output, expected);
}

#[tokio::test]
async fn golden_scroll_at_bottom() {
    let expected = fixture::read_unescaped("prompt_scroll_at_bottom.txt");
    let terminal = MemoryTerminal::new(20, 3).with_cursor_top(2);
    let output = session_output(terminal, "a\x1b[13;2u\r").await;
    assert_eq!(output, expected);
}

#[tokio::test]
async fn golden_clear_screen() {
    let expected = fixture::read_unescaped("prompt_clear_screen.txt");
    let terminal = MemoryTerminal::new(20, 5).with_cursor_top(2);
    let output = session_output(terminal, "a\x0c\r").await;
    assert_eq!(output, expected);
}

#[test]
fn middle_row_change_rewrites_only_that_row() {
    let mut renderer = DiffRenderer::new(0);
    renderer.render(frame(&["> a", "  b", "  c"]), viewport(20, 10), false);

    let output = encode(&renderer.render(frame(&["> a", "  B", "  c"]), viewport(20, 10), false));
    // Cursor defaults to the end of the last row.
    assert_eq!(output, "\x1b[1A\x1b[1G\x1b[0K  B\x1b[1B\x1b[4G");
}

#[test]
fn clear_screen_repaints_then_identical_frame_is_silent() {
    let mut renderer = DiffRenderer::new(0);
    renderer.render(frame(&["> a"]), viewport(20, 10), false);

    let output = encode(&renderer.render(frame(&["> a"]), viewport(20, 10), true));
    assert!(output.contains("> a"), "{output:?}");

    let output = encode(&renderer.render(frame(&["> a"]), viewport(20, 10), false));
    assert_eq!(output, "");
}

#[test]
fn height_change_repaints_and_clamps_top() {
    let mut renderer = DiffRenderer::new(8);
    renderer.render(frame(&["> a"]), viewport(20, 10), false);

    let output = encode(&renderer.render(frame(&["> a"]), viewport(20, 4), false));
    assert_eq!(output, "\x1b[1G\x1b[0J> a\x1b[4G");
    assert_eq!(renderer.top(), 3);
}

#[test]
fn finish_moves_below_overlay_rows_and_erases_them() {
    let mut renderer = DiffRenderer::new(0);
    let frame = frame(&["> a"])
        .with_overlay(vec!["  item".to_string().into()])
        .with_cursor(None);
    renderer.render(frame, viewport(20, 10), false);

    let output = encode(&renderer.finish(10));
    assert_eq!(output, "\x1b[1A\r\n\x1b[0J");
    assert_eq!(renderer.top(), 1);
    assert!(renderer.previous_lines().is_empty());
}
