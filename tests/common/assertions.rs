/// Command string assertion utilities
#[allow(dead_code)]
pub fn assert_cmd_contains(cmd: &str, fragment: &str) {
    assert!(
        cmd.contains(fragment),
        "Expected ffmpeg command to contain '{}' but it didn't.\nCommand: {}",
        fragment,
        cmd
    );
}

#[allow(dead_code)]
pub fn assert_cmd_not_contains(cmd: &str, fragment: &str) {
    assert!(
        !cmd.contains(fragment),
        "Expected ffmpeg command to NOT contain '{}' but it did.\nCommand: {}",
        fragment,
        cmd
    );
}

/// Check that a flag is immediately followed by `value`
#[allow(dead_code)]
pub fn assert_cmd_has_flag_value(cmd: &str, flag: &str, value: &str) {
    let pattern = format!("{} {}", flag, value);
    assert!(
        cmd.contains(&pattern),
        "Expected ffmpeg command to contain '{}' but it didn't.\nCommand: {}",
        pattern,
        cmd
    );
}

/// Check that the fragments appear in the given order
#[allow(dead_code)]
pub fn assert_cmd_order(cmd: &str, fragments: &[&str]) {
    let mut from = 0;
    for fragment in fragments {
        match cmd[from..].find(fragment) {
            Some(pos) => from += pos + fragment.len(),
            None => panic!(
                "Expected '{}' after position {} in ffmpeg command.\nCommand: {}",
                fragment, from, cmd
            ),
        }
    }
}

/// Value following a flag (e.g. "768k" from "-b:v 768k")
#[allow(dead_code)]
pub fn get_flag_value<'a>(cmd: &'a str, flag: &str) -> Option<&'a str> {
    let pattern = format!("{} ", flag);
    cmd.find(&pattern).and_then(|pos| {
        let after_flag = &cmd[pos + pattern.len()..];
        after_flag.split_whitespace().next()
    })
}
