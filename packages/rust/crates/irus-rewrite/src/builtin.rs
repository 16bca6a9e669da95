//! Built-in rule sets.
//!
//! One full conversion set per target platform plus a few small starter
//! sets. Built-ins are constructed on demand and cannot be deleted from a
//! registry.
//!
//! Patterns avoid look-around; import rewrites are anchored per line so
//! `from mss import mss` is not touched by the `import mss` rule.

use crate::rule::RewriteRule;
use crate::rule_set::{Boilerplate, RuleSet};
use crate::types::TargetPlatform;

/// Author recorded on every built-in set.
pub const BUILTIN_AUTHOR: &str = "IRUS Team";

const BUILTIN_CREATED: &str = "2025-01-01";

/// Names of the built-in sets, in listing order.
pub const BUILTIN_NAMES: &[&str] = &[
    "macOS",
    "Linux",
    "Cross-Platform",
    "Basic macOS",
    "Gaming Macro",
    "Web Automation",
];

/// Every built-in rule set, in listing order.
#[must_use]
pub fn builtin_rule_sets() -> Vec<RuleSet> {
    vec![
        macos(),
        linux(),
        cross_platform(),
        basic_macos(),
        gaming_macro(),
        web_automation(),
    ]
}

/// The full conversion set for `platform`.
#[must_use]
pub fn builtin_for_platform(platform: TargetPlatform) -> RuleSet {
    match platform {
        TargetPlatform::MacOs => macos(),
        TargetPlatform::Linux => linux(),
        TargetPlatform::CrossPlatform => cross_platform(),
    }
}

/// Whether `name` is reserved by a built-in set.
#[must_use]
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

fn builtin(name: &str, platform: TargetPlatform, description: &str) -> RuleSet {
    let mut set = RuleSet::new(name, platform).with_description(description);
    set.author = BUILTIN_AUTHOR.to_string();
    set.created = Some(BUILTIN_CREATED.to_string());
    set
}

fn with_category(mut set: RuleSet, category: &str) -> RuleSet {
    set.category = Some(category.to_string());
    set
}

fn with_rules(set: RuleSet, rules: impl IntoIterator<Item = RewriteRule>) -> RuleSet {
    rules.into_iter().fold(set, RuleSet::with_rule)
}

fn with_blocks(set: RuleSet, blocks: impl IntoIterator<Item = Boilerplate>) -> RuleSet {
    blocks.into_iter().fold(set, RuleSet::with_boilerplate)
}

// ---------------------------------------------------------------------------
// Shared rule groups
// ---------------------------------------------------------------------------

fn windll_removal() -> Vec<RewriteRule> {
    vec![
        RewriteRule::regex(
            "windows_api",
            r"(?m)^from ctypes import windll[ \t]*$",
            "# Windows DLL access removed",
        )
        .describe("Drop ctypes.windll imports"),
        RewriteRule::regex(
            "windows_api",
            r"\b(?:ctypes\.)?windll\.[\w.]+\([^)]*\)",
            "None  # Windows API call removed",
        )
        .describe("Remove direct Windows DLL calls"),
    ]
}

fn path_rules(home: &str) -> Vec<RewriteRule> {
    vec![
        RewriteRule::regex("path_conversion", r"\b[A-Za-z]:\\\\Users\\\\", home)
            .describe("Map the Windows user directory"),
        RewriteRule::regex("path_conversion", r"\b[A-Za-z]:\\Users\\", home)
            .describe("Map the Windows user directory in raw strings"),
        RewriteRule::regex("path_conversion", r"\b[A-Za-z]:\\\\", "/")
            .describe("Strip drive letters"),
        RewriteRule::literal("path_conversion", "\\\\", "/")
            .describe("Use forward slashes as path separators"),
    ]
}

fn performance_rules() -> Vec<RewriteRule> {
    vec![
        RewriteRule::regex("performance_fix", r"time\.sleep\(0\)", "time.sleep(0.001)")
            .describe("Fix zero-delay sleep calls"),
        RewriteRule::regex(
            "performance_fix",
            r"cv2\.waitKey\(1\)(?:\s*&\s*0xFF)?",
            "cv2.waitKey(1) & 0xFF",
        )
        .describe("Mask cv2.waitKey results"),
    ]
}

fn import_blocks() -> Vec<Boilerplate> {
    vec![
        Boilerplate::new("time import", "time.sleep", "import time").unless("import time"),
        Boilerplate::new("threading import", "threading.", "import threading")
            .unless("import threading"),
    ]
}

// ---------------------------------------------------------------------------
// macOS
// ---------------------------------------------------------------------------

const MOUSE_SETUP: &str = "\
# macOS mouse control
from pynput import mouse
from pynput.mouse import Button
mouse_controller = mouse.Controller()";

const KEYBOARD_SETUP: &str = "\
# macOS keyboard control
from pynput import keyboard
from pynput.keyboard import Key
keyboard_controller = keyboard.Controller()";

const KEY_STATE_HELPERS: &str = r#"# macOS key state helpers
import time
from pynput import keyboard as _keyboard

_pressed_keys = set()


def _key_name(key):
    return getattr(key, "char", None) or getattr(key, "name", str(key))


def _on_press(key):
    _pressed_keys.add(_key_name(key))


def _on_release(key):
    _pressed_keys.discard(_key_name(key))


_key_listener = _keyboard.Listener(on_press=_on_press, on_release=_on_release)
_key_listener.start()


def is_key_pressed(name):
    return name in _pressed_keys


def wait_for_key(name):
    while not is_key_pressed(name):
        time.sleep(0.01)"#;

const SCREEN_CAPTURE: &str = r#"# macOS screen capture
import Quartz
import numpy as np


def capture_screen_region(region=None):
    rect = Quartz.CGRectInfinite if region is None else Quartz.CGRectMake(*region)
    image = Quartz.CGWindowListCreateImage(
        rect,
        Quartz.kCGWindowListOptionOnScreenOnly,
        Quartz.kCGNullWindowID,
        Quartz.kCGWindowImageDefault,
    )
    width = Quartz.CGImageGetWidth(image)
    height = Quartz.CGImageGetHeight(image)
    row_bytes = Quartz.CGImageGetBytesPerRow(image)
    data = Quartz.CGDataProviderCopyData(Quartz.CGImageGetDataProvider(image))
    frame = np.frombuffer(data, dtype=np.uint8).reshape((height, row_bytes // 4, 4))
    return frame[:, :width, :]"#;

fn macos() -> RuleSet {
    let set = builtin(
        "macOS",
        TargetPlatform::MacOs,
        "Convert Windows automation scripts to macOS (pynput, Quartz)",
    );

    let imports = vec![
        RewriteRule::regex(
            "import",
            r"(?m)^(?:from mss import mss|import mss)[ \t]*$",
            r"# Screen capture via Quartz (see capture_screen_region)",
        )
        .describe("Replace mss with Quartz capture"),
        RewriteRule::regex(
            "import",
            r"(?m)^(?:import pyautogui|from pyautogui import .*)[ \t]*$",
            r"from pynput.mouse import Button",
        )
        .describe("Replace pyautogui with pynput"),
        RewriteRule::regex(
            "import",
            r"(?m)^(?:import keyboard|from keyboard import .*)[ \t]*$",
            r"from pynput.keyboard import Key",
        )
        .describe("Replace keyboard with pynput"),
        RewriteRule::regex(
            "import",
            r"(?m)^import win32api[ \t]*$",
            "import subprocess  # macOS equivalent for system calls",
        ),
        RewriteRule::regex(
            "import",
            r"(?m)^import win32gui[ \t]*$",
            "import Quartz  # window management",
        ),
        RewriteRule::regex(
            "import",
            r"(?m)^import win32con[ \t]*$",
            "import Cocoa  # constants",
        ),
        RewriteRule::regex(
            "import",
            r"(?m)^import winsound[ \t]*$",
            "import subprocess  # use afplay for audio",
        ),
        RewriteRule::regex(
            "import",
            r"(?m)^import msvcrt[ \t]*$",
            "import termios, tty  # terminal control",
        ),
    ];

    let screen = vec![
        RewriteRule::regex(
            "screen_capture",
            r"with mss\.mss\(\) as \w+:",
            "if True:  # screen capture via capture_screen_region()",
        )
        .describe("Drop the mss context manager"),
        RewriteRule::regex(
            "screen_capture",
            r"\b(?:mss\.mss\(\)|sct)\.grab\([^)]*\)",
            "capture_screen_region()",
        )
        .describe("Replace mss grabs"),
    ];

    let mouse = vec![
        RewriteRule::regex(
            "mouse",
            r"pyautogui\.click\(\)",
            "mouse_controller.click(Button.left, 1)",
        ),
        RewriteRule::regex(
            "mouse",
            r"pyautogui\.click\(([^)]+)\)",
            r"mouse_controller.position = (\1); mouse_controller.click(Button.left, 1)",
        )
        .describe("Move then click"),
        RewriteRule::regex(
            "mouse",
            r"pyautogui\.rightClick\(\)",
            "mouse_controller.click(Button.right, 1)",
        ),
        RewriteRule::regex(
            "mouse",
            r"pyautogui\.rightClick\(([^)]+)\)",
            r"mouse_controller.position = (\1); mouse_controller.click(Button.right, 1)",
        ),
        RewriteRule::regex(
            "mouse",
            r"pyautogui\.moveTo\(([^)]+)\)",
            r"mouse_controller.position = (\1)",
        ),
        RewriteRule::regex("mouse", r"pyautogui\.position\(\)", "mouse_controller.position"),
        RewriteRule::regex(
            "mouse",
            r"pyautogui\.mouseDown\(\)",
            "mouse_controller.press(Button.left)",
        ),
        RewriteRule::regex(
            "mouse",
            r"pyautogui\.mouseUp\(\)",
            "mouse_controller.release(Button.left)",
        ),
    ];

    let keys = vec![
        RewriteRule::regex(
            "keyboard",
            r#"keyboard\.is_pressed\(['"]([^'"]+)['"]\)"#,
            r#"is_key_pressed("\1")"#,
        ),
        RewriteRule::regex(
            "keyboard",
            r#"keyboard\.wait\(['"]([^'"]+)['"]\)"#,
            r#"wait_for_key("\1")"#,
        ),
        RewriteRule::regex(
            "keyboard",
            r#"(?:keyboard\.press_and_release|pyautogui\.press)\(['"]([^'"]{2,})['"]\)"#,
            r"keyboard_controller.tap(Key.\1)",
        )
        .describe("Tap named keys"),
        RewriteRule::regex(
            "keyboard",
            r#"(?:keyboard\.press_and_release|pyautogui\.press)\(['"]([^'"])['"]\)"#,
            r"keyboard_controller.tap('\1')",
        )
        .describe("Tap character keys"),
        RewriteRule::regex(
            "keyboard",
            r#"(?:keyboard\.press|pyautogui\.keyDown)\(['"]([^'"]{2,})['"]\)"#,
            r"keyboard_controller.press(Key.\1)",
        ),
        RewriteRule::regex(
            "keyboard",
            r#"(?:keyboard\.press|pyautogui\.keyDown)\(['"]([^'"])['"]\)"#,
            r"keyboard_controller.press('\1')",
        ),
        RewriteRule::regex(
            "keyboard",
            r#"(?:keyboard\.release|pyautogui\.keyUp)\(['"]([^'"]{2,})['"]\)"#,
            r"keyboard_controller.release(Key.\1)",
        ),
        RewriteRule::regex(
            "keyboard",
            r#"(?:keyboard\.release|pyautogui\.keyUp)\(['"]([^'"])['"]\)"#,
            r"keyboard_controller.release('\1')",
        ),
    ];

    let system = vec![
        RewriteRule::regex(
            "windows_api",
            r"\b(GetDC|GetDeviceCaps|ReleaseDC)\([^)]*\)",
            r"None  # \1 removed",
        )
        .describe("Remove GDI device-context calls"),
        RewriteRule::regex(
            "terminal",
            r#"os\.system\(['"]cls['"]\)"#,
            r#"os.system("clear")"#,
        ),
    ];

    let set = with_rules(
        set,
        imports
            .into_iter()
            .chain(screen)
            .chain(mouse)
            .chain(keys)
            .chain(windll_removal())
            .chain(system)
            .chain(path_rules("/Users/"))
            .chain(performance_rules()),
    );

    with_blocks(
        set,
        import_blocks().into_iter().chain([
            Boilerplate::new("mouse controller", "mouse_controller", MOUSE_SETUP)
                .unless("mouse_controller = mouse.Controller()"),
            Boilerplate::new("keyboard controller", "keyboard_controller", KEYBOARD_SETUP)
                .unless("keyboard_controller = keyboard.Controller()"),
            Boilerplate::new("key state helpers", "is_key_pressed(", KEY_STATE_HELPERS)
                .or_when("wait_for_key(")
                .unless("def is_key_pressed("),
            Boilerplate::new("screen capture", "capture_screen_region(", SCREEN_CAPTURE)
                .unless("def capture_screen_region("),
        ]),
    )
}

// ---------------------------------------------------------------------------
// Linux
// ---------------------------------------------------------------------------

fn linux() -> RuleSet {
    let set = builtin(
        "Linux",
        TargetPlatform::Linux,
        "Convert Windows automation scripts to Linux",
    );

    let imports = vec![
        RewriteRule::regex(
            "import",
            r"(?m)^import win32api[ \t]*$",
            "import subprocess  # Linux equivalent for system calls",
        ),
        RewriteRule::regex(
            "import",
            r"(?m)^import (?:win32gui|win32con|win32ui)[ \t]*$",
            "# Windows GUI module removed: use python-xlib or pynput",
        )
        .describe("Drop Windows GUI modules"),
        RewriteRule::regex(
            "import",
            r"(?m)^import winsound[ \t]*$",
            "import subprocess  # use aplay for audio",
        ),
        RewriteRule::regex(
            "import",
            r"(?m)^import msvcrt[ \t]*$",
            "import termios, tty  # terminal control",
        ),
    ];

    let set = with_rules(
        set,
        imports
            .into_iter()
            .chain(windll_removal())
            .chain([RewriteRule::regex(
                "terminal",
                r#"os\.system\(['"]cls['"]\)"#,
                r#"os.system("clear")"#,
            )])
            .chain(path_rules("/home/"))
            .chain(performance_rules()),
    );

    with_blocks(set, import_blocks())
}

// ---------------------------------------------------------------------------
// Cross-Platform
// ---------------------------------------------------------------------------

fn cross_platform() -> RuleSet {
    let set = builtin(
        "Cross-Platform",
        TargetPlatform::CrossPlatform,
        "Guard Windows-only code so scripts run on any platform",
    );

    let rules = vec![
        RewriteRule::regex(
            "import",
            r"(?m)^import (win32api|win32gui|win32con|win32ui|winsound|msvcrt)[ \t]*$",
            "if sys.platform == \"win32\":\n    import \\1",
        )
        .describe("Guard Windows-only imports"),
        RewriteRule::regex(
            "import",
            r"(?m)^from ctypes import windll[ \t]*$",
            "if sys.platform == \"win32\":\n    from ctypes import windll",
        ),
        RewriteRule::regex(
            "terminal",
            r#"os\.system\(['"]cls['"]\)"#,
            r#"os.system("cls" if os.name == "nt" else "clear")"#,
        ),
        RewriteRule::literal("path_conversion", "\\\\", "/")
            .describe("Forward slashes work on every platform"),
    ];

    let set = with_rules(set, rules.into_iter().chain(performance_rules()));

    with_blocks(
        set,
        std::iter::once(
            Boilerplate::new("sys import", "sys.platform", "import sys").unless("import sys"),
        )
        .chain(import_blocks()),
    )
}

// ---------------------------------------------------------------------------
// Starter sets
// ---------------------------------------------------------------------------

fn basic_macos() -> RuleSet {
    let set = with_category(
        builtin(
            "Basic macOS",
            TargetPlatform::MacOs,
            "Basic Windows to macOS conversion",
        ),
        "macOS",
    );
    with_rules(
        set,
        [
            RewriteRule::literal(
                "import_replacement",
                "import win32api",
                "import subprocess  # Not available on macOS",
            )
            .describe("Replace Windows-specific imports"),
            RewriteRule::regex("path_conversion", r"\b[A-Za-z]:\\\\", "/Users/")
                .describe("Convert Windows paths to macOS"),
            RewriteRule::regex("performance_fix", r"time\.sleep\(0\)", "time.sleep(0.001)")
                .describe("Fix zero-delay sleep calls"),
        ],
    )
}

fn gaming_macro() -> RuleSet {
    let set = with_category(
        builtin(
            "Gaming Macro",
            TargetPlatform::CrossPlatform,
            "Specialized template for gaming macros",
        ),
        "Gaming",
    );
    with_rules(
        set,
        [
            RewriteRule::literal(
                "input_replacement",
                "import win32gui",
                "from pynput import mouse, keyboard",
            )
            .describe("Replace Windows input with cross-platform"),
            RewriteRule::literal("screen_capture", "import win32ui", "from PIL import ImageGrab")
                .describe("Replace Windows screen capture"),
        ],
    )
}

fn web_automation() -> RuleSet {
    let set = with_category(
        builtin(
            "Web Automation",
            TargetPlatform::CrossPlatform,
            "Template for web automation scripts",
        ),
        "Web",
    );
    let set = with_rules(
        set,
        [RewriteRule::literal(
            "browser_setup",
            "webdriver.Chrome()",
            "webdriver.Chrome(options=chrome_options)",
        )
        .describe("Add Chrome options for better compatibility")],
    );
    with_blocks(
        set,
        [Boilerplate::new(
            "chrome options",
            "options=chrome_options",
            "from selenium.webdriver.chrome.options import Options\nchrome_options = Options()",
        )
        .unless("chrome_options =")],
    )
}
