//! Function-prototype table
//!
//! For each GS1 built-in, which argument positions are read as unquoted text
//! (`setimg door.png;`) rather than parsed as expressions. Functions with no
//! string positions are still listed so the table doubles as the set of
//! known built-ins.

/// String-favoring hints for one built-in
#[derive(Debug, PartialEq, Eq)]
pub struct Prototype {
    pub name: &'static str,
    pub string_args: &'static [bool],
}

const fn proto(name: &'static str, string_args: &'static [bool]) -> Prototype {
    Prototype { name, string_args }
}

const S: bool = true;
const N: bool = false;

pub static PROTOTYPES: &[Prototype] = &[
    // Appearance
    proto("setimg", &[S]),
    proto("setgif", &[S]),
    proto("setimgpart", &[S, N, N, N, N]),
    proto("setcharprop", &[S, S]),
    proto("setplayerprop", &[S, S]),
    proto("setcharani", &[S, S]),
    proto("setani", &[S, S]),
    proto("setshape", &[]),
    proto("setcoloreffect", &[]),
    proto("setzoomeffect", &[]),
    proto("sethead", &[S]),
    proto("setbody", &[S]),
    proto("setsword", &[S, N]),
    proto("setshield", &[S, N]),
    proto("show", &[]),
    proto("hide", &[]),
    proto("destroy", &[]),
    proto("dontblock", &[]),
    proto("blockagain", &[]),
    proto("drawoverplayer", &[]),
    proto("drawunderplayer", &[]),
    proto("canbecarried", &[]),
    proto("canbepushed", &[]),
    proto("canbepulled", &[]),
    proto("timereverywhere", &[]),

    // Messages and sound
    proto("message", &[S]),
    proto("say", &[]),
    proto("say2", &[S]),
    proto("play", &[S]),
    proto("play2", &[S, N, N, N]),
    proto("playlooped", &[S]),
    proto("stopsound", &[S]),
    proto("sendtonc", &[S]),
    proto("sendtorc", &[S]),
    proto("savelog", &[S]),
    proto("openurl", &[S]),
    proto("showimg", &[N, S, N, N]),
    proto("hideimg", &[]),
    proto("showtext", &[N, N, N, S, S, S]),

    // Flags and strings
    proto("set", &[S]),
    proto("unset", &[S]),
    proto("setstring", &[S, S]),
    proto("addstring", &[S, S]),
    proto("deletestring", &[S, N]),
    proto("insertstring", &[S, N, S]),
    proto("replacestring", &[S, N, S]),
    proto("removestring", &[S, S]),
    proto("setarray", &[S, N]),
    proto("tokenize", &[S]),
    proto("tokenize2", &[S, S]),
    proto("strlen", &[]),
    proto("strequals", &[]),
    proto("startswith", &[]),
    proto("substring", &[]),
    proto("playersays", &[S]),

    // World placement
    proto("putnpc", &[S, S, N, N]),
    proto("putnpc2", &[N, N, S]),
    proto("putbomb", &[]),
    proto("putexplosion", &[]),
    proto("putleaps", &[]),
    proto("putcomp", &[]),
    proto("putcomp2", &[]),
    proto("lay", &[S]),
    proto("lay2", &[S, N, N]),
    proto("triggeraction", &[N, N, S, S]),
    proto("testnpc", &[]),
    proto("onwall", &[]),
    proto("updateboard", &[]),
    proto("setfocus", &[]),
    proto("move", &[]),
    proto("shoot", &[N, N, N, N, N, N, S, S]),
    proto("callnpc", &[N, S]),
    proto("callweapon", &[N, S]),

    // Player
    proto("hurt", &[]),
    proto("setlevel", &[S]),
    proto("setlevel2", &[S, N, N]),
    proto("serverwarp", &[S]),
    proto("addweapon", &[S]),
    proto("removeweapon", &[S]),
    proto("hasweapon", &[S]),
    proto("toweapons", &[S]),
    proto("join", &[S]),
    proto("carryobject", &[S]),
    proto("throwcarry", &[]),
    proto("freezeplayer", &[]),
    proto("disableweapons", &[]),
    proto("enableweapons", &[]),
    proto("disabledefmovement", &[]),
    proto("enabledefmovement", &[]),
    proto("keydown", &[]),
    proto("sleep", &[]),

    // Math
    proto("abs", &[]),
    proto("sin", &[]),
    proto("cos", &[]),
    proto("arctan", &[]),
    proto("log", &[]),
    proto("exp", &[]),
    proto("int", &[]),
    proto("min", &[]),
    proto("max", &[]),
    proto("random", &[]),
    proto("getangle", &[]),
    proto("getdir", &[]),
    proto("vecx", &[]),
    proto("vecy", &[]),
];

/// Look up the prototype of a built-in
pub fn lookup_prototype(name: &str) -> Option<&'static Prototype> {
    PROTOTYPES.iter().find(|p| p.name == name)
}

/// Whether argument `index` of `name` is read as raw text
pub fn favors_string(name: &str, index: usize) -> bool {
    lookup_prototype(name)
        .and_then(|p| p.string_args.get(index).copied())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_hints() {
        assert!(favors_string("setimg", 0));
        assert!(!favors_string("setimg", 1));
        assert!(favors_string("putnpc2", 2));
        assert!(!favors_string("putnpc2", 0));
        assert!(!favors_string("unknownfn", 0));
    }

    #[test]
    fn test_prototype_names_unique() {
        for (i, a) in PROTOTYPES.iter().enumerate() {
            assert!(PROTOTYPES[i + 1..].iter().all(|b| b.name != a.name), "{}", a.name);
        }
    }
}
