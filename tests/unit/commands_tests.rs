/*!
 * Tests for console command parsing
 */

use langrepeat::playback::UserCommand;

#[test]
fn test_parse_withShortKeys_shouldMapToCommands() {
    let cases = [
        ("p", UserCommand::TogglePause),
        (" ", UserCommand::TogglePause),
        ("n", UserCommand::Next),
        ("b", UserCommand::Previous),
        ("+", UserCommand::IncreaseExtra),
        ("-", UserCommand::DecreaseExtra),
        ("r", UserCommand::Reload),
        ("q", UserCommand::Quit),
    ];

    for (input, expected) in cases {
        assert_eq!(input.parse::<UserCommand>().unwrap(), expected, "input {:?}", input);
    }
}

#[test]
fn test_parse_withWordsInAnyCase_shouldMapToCommands() {
    assert_eq!("Pause".parse::<UserCommand>().unwrap(), UserCommand::TogglePause);
    assert_eq!("stop".parse::<UserCommand>().unwrap(), UserCommand::Pause);
    assert_eq!("RESUME".parse::<UserCommand>().unwrap(), UserCommand::Resume);
    assert_eq!("right".parse::<UserCommand>().unwrap(), UserCommand::Next);
    assert_eq!("left".parse::<UserCommand>().unwrap(), UserCommand::Previous);
}

#[test]
fn test_parse_withGoto_shouldConvertToZeroBasedIndex() {
    assert_eq!("g 12".parse::<UserCommand>().unwrap(), UserCommand::JumpTo(11));
    assert_eq!("goto 1".parse::<UserCommand>().unwrap(), UserCommand::JumpTo(0));
    // Segment 0 does not exist; it saturates to the first segment
    assert_eq!("g 0".parse::<UserCommand>().unwrap(), UserCommand::JumpTo(0));
}

#[test]
fn test_parse_withInvalidInput_shouldFail() {
    assert!("".parse::<UserCommand>().is_err());
    assert!("dance".parse::<UserCommand>().is_err());
    assert!("g".parse::<UserCommand>().is_err());
    assert!("g twelve".parse::<UserCommand>().is_err());
}
