use crate::parser::ArgParser;
use crate::slot::Slot;

#[inline(never)]
fn push_str(out: &mut String, s: &str) {
    out.push_str(s);
}

impl ArgParser<'_> {
    /// Render the help text from the declared arguments.
    #[must_use]
    pub fn help_description(&self) -> String {
        let mut out = String::new();
        render_help_into(&mut out, self);
        out
    }
}

#[cold]
fn render_help_into(out: &mut String, parser: &ArgParser<'_>) {
    macro_rules! w {
        ($($e:expr),*) => {{
            $(push_str(out, $e);)*
        }};
    }

    let help = parser.help_slot();

    w!(parser.name(), "\n");
    match help {
        Some(help) => w!(&help.metadata().description, "\n\n"),
        None => w!("No description specified\n"),
    }

    let is_help = |slot: &Slot<'_>| help.is_some_and(|h| std::ptr::eq(h, slot));
    for slot in parser.slots().filter(|slot| !is_help(*slot)) {
        let meta = slot.metadata();
        let mut buf = [0u8; 4];
        match meta.short_name {
            Some(ch) => w!("-", ch.encode_utf8(&mut buf), ",  "),
            None => w!("     "),
        }
        w!("--", &meta.name);
        let label = slot.type_label();
        if !meta.is_flag && !label.is_empty() {
            w!("=<", label, ">");
        }
        w!(",  ", &meta.description);
        if meta.is_positional {
            w!(" [positional]");
        }
        if meta.is_multi_value {
            w!(" [repeated, min args = ", &meta.minimum_args.to_string(), "]");
        }
        if let Some(default) = slot.default_string() {
            w!(" [default = ", &default, "]");
        }
        w!("\n");
    }
    w!("\n");

    if let Some(help) = help {
        let mut buf = [0u8; 4];
        match help.metadata().short_name {
            Some(ch) => w!("-", ch.encode_utf8(&mut buf), ", "),
            None => w!("    "),
        }
        w!("--", help.name(), " Display this help and exit\n");
    }
}
