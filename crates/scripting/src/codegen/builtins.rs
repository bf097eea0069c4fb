//! Built-in command and function table
//!
//! Maps GS1 built-ins to target-language text. Most entries are templates
//! where `$0`..`$9` stand for translated arguments and `$*` for all of them.
//! An entry that cannot handle a call (too few arguments, unexpected
//! argument shape) declines, and the call is emitted generically.

use super::{ExprCtx, Generator, Target};
use crate::gs1::ast::Expr;
use crate::tables::{is_root, ParamRole, CHAT_ACTION};
use gs1conv_core::Axis;
use std::collections::HashMap;

/// Custom translation; `None` means "not handled"
pub type BuiltinFn = fn(&mut Generator, &[Expr], ExprCtx) -> Option<String>;

/// How one built-in is translated
#[derive(Debug, Clone, Copy)]
pub enum Builtin {
    /// Plain template
    Template { min_args: usize, text: &'static str },
    /// Template whose `$0` names a variable (`addstring list, x`)
    Variable { min_args: usize, text: &'static str },
    /// Template whose `x`/`y` arguments are tile coordinates
    Placement {
        min_args: usize,
        x: usize,
        y: usize,
        text: &'static str,
    },
    /// Call to a generated helper method
    Helper { min_args: usize, helper: &'static str },
    /// Hand-written translation
    Custom(BuiltinFn),
}

impl Builtin {
    /// Translate a call, or decline
    pub fn apply(self, g: &mut Generator, args: &[Expr], ctx: ExprCtx) -> Option<String> {
        match self {
            Builtin::Template { min_args, text } if args.len() >= min_args => {
                let rendered = g.render_args(args, ctx);
                Some(fill(text, &rendered))
            }
            Builtin::Variable { min_args, text } if args.len() >= min_args.max(1) => {
                let mut rendered = vec![g.variable(&args[0], ctx)];
                rendered.extend(g.render_args(&args[1..], ctx));
                Some(fill(text, &rendered))
            }
            Builtin::Placement { min_args, x, y, text } if args.len() >= min_args => {
                let mut rendered = g.render_args(args, ctx);
                let coordinates = g.options().coordinates;
                rendered[x] = coordinates.tile_to_pixels(&rendered[x], Axis::X);
                rendered[y] = coordinates.tile_to_pixels(&rendered[y], Axis::Y);
                Some(fill(text, &rendered))
            }
            Builtin::Helper { min_args, helper } if args.len() >= min_args => {
                g.request_helper(helper);
                let rendered = g.render_args(args, ctx);
                Some(format!("this.{}({})", helper, rendered.join(", ")))
            }
            Builtin::Custom(custom) => custom(g, args, ctx),
            _ => None,
        }
    }
}

/// Substitute translated arguments into a template
fn fill(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }
        match chars.peek().copied() {
            Some('*') => {
                chars.next();
                out.push_str(&args.join(", "));
            }
            Some(d) if d.is_ascii_digit() => {
                chars.next();
                let index = d as usize - '0' as usize;
                if let Some(arg) = args.get(index) {
                    out.push_str(arg);
                }
            }
            _ => out.push('$'),
        }
    }

    out
}

/// Built-in function registry
#[derive(Debug)]
pub struct Builtins {
    functions: HashMap<&'static str, Builtin>,
}

impl Builtins {
    /// Create a new builtins registry
    pub fn new() -> Self {
        let mut functions = HashMap::new();

        register_appearance_functions(&mut functions);
        register_message_functions(&mut functions);
        register_string_functions(&mut functions);
        register_placement_functions(&mut functions);
        register_player_functions(&mut functions);
        register_math_functions(&mut functions);

        Self { functions }
    }

    /// Look up a built-in
    pub fn get(&self, name: &str) -> Option<Builtin> {
        self.functions.get(name).copied()
    }

    /// Names of all built-ins
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

const fn template(min_args: usize, text: &'static str) -> Builtin {
    Builtin::Template { min_args, text }
}

const fn variable(min_args: usize, text: &'static str) -> Builtin {
    Builtin::Variable { min_args, text }
}

const fn placement(min_args: usize, x: usize, y: usize, text: &'static str) -> Builtin {
    Builtin::Placement { min_args, x, y, text }
}

const fn helper(min_args: usize, helper: &'static str) -> Builtin {
    Builtin::Helper { min_args, helper }
}

/// Register image, visibility and blocking functions
fn register_appearance_functions(map: &mut HashMap<&'static str, Builtin>) {
    map.insert("setimg", template(1, "this.image = $0"));
    map.insert("setgif", template(1, "this.image = $0"));
    map.insert("setimgpart", template(5, "this.setImgPart($*)"));
    map.insert("setcharprop", Builtin::Custom(builtin_setcharprop));
    map.insert("setplayerprop", Builtin::Custom(builtin_setplayerprop));
    map.insert("setcharani", template(1, "this.setAni($*)"));
    map.insert("setani", template(1, "this.setAni($*)"));
    map.insert("setshape", template(3, "this.setShape($*)"));
    map.insert("setcoloreffect", template(4, "this.setColorEffect($*)"));
    map.insert("setzoomeffect", template(1, "this.zoom = $0"));
    map.insert("sethead", template(1, "player.head = $0"));
    map.insert("setbody", template(1, "player.body = $0"));
    map.insert("setsword", template(2, "player.setSword($0, $1)"));
    map.insert("setshield", template(2, "player.setShield($0, $1)"));

    map.insert("show", template(0, "this.show()"));
    map.insert("hide", template(0, "this.hide()"));
    map.insert("destroy", template(0, "this.destroy()"));
    map.insert("dontblock", template(0, "this.dontBlock()"));
    map.insert("blockagain", template(0, "this.blockAgain()"));
    map.insert("drawoverplayer", template(0, "this.drawOverPlayer()"));
    map.insert("drawunderplayer", template(0, "this.drawUnderPlayer()"));
    map.insert("canbecarried", template(0, "this.canBeCarried()"));
    map.insert("canbepushed", template(0, "this.canBePushed()"));
    map.insert("canbepulled", template(0, "this.canBePulled()"));
    map.insert("timereverywhere", template(0, "this.timerEverywhere()"));
}

/// Register text, sound and logging functions
fn register_message_functions(map: &mut HashMap<&'static str, Builtin>) {
    map.insert("message", template(1, "this.say($0)"));
    map.insert("say", template(1, "this.level.showSign(player, $0)"));
    map.insert("say2", template(1, "player.showText($0)"));
    map.insert("play", template(1, "this.play($0)"));
    map.insert("play2", template(4, "this.play2($*)"));
    map.insert("playlooped", template(1, "this.playLooped($0)"));
    map.insert("stopsound", template(1, "this.stopSound($0)"));
    map.insert("sendtonc", template(1, "sendToNC($0)"));
    map.insert("sendtorc", template(1, "sendToRC($0)"));
    map.insert("savelog", template(1, "saveLog($0)"));
    map.insert("openurl", template(1, "player.openUrl($0)"));
    map.insert("showimg", template(4, "this.showImg($*)"));
    map.insert("hideimg", template(1, "this.hideImg($0)"));
    map.insert("showtext", template(6, "this.showText($*)"));
}

/// Register flag, string-list and chat functions
fn register_string_functions(map: &mut HashMap<&'static str, Builtin>) {
    map.insert("set", Builtin::Custom(builtin_set));
    map.insert("unset", Builtin::Custom(builtin_unset));
    map.insert("setstring", variable(2, "$0 = $1"));
    map.insert("addstring", variable(2, "$0.add($1)"));
    map.insert("deletestring", variable(2, "$0.delete($1)"));
    map.insert("insertstring", variable(3, "$0.insert($1, $2)"));
    map.insert("replacestring", variable(3, "$0[$1] = $2"));
    map.insert("removestring", variable(2, "$0.remove($1)"));
    map.insert("setarray", variable(2, "$0 = array($1)"));
    map.insert("tokenize", template(1, "this.tokens = $0.tokenize()"));
    map.insert("tokenize2", template(2, "this.tokens = $0.tokenize($1)"));
    map.insert("strlen", template(1, "$0.length"));
    map.insert("strequals", template(2, "($0 == $1)"));
    map.insert("startswith", template(2, "$1.starts($0)"));
    map.insert("substring", template(3, "substring($0, $1, $2)"));
    map.insert("playersays", Builtin::Custom(builtin_playersays));
}

/// Register functions that place or query things at tile coordinates
fn register_placement_functions(map: &mut HashMap<&'static str, Builtin>) {
    map.insert("putnpc", placement(4, 2, 3, "this.level.putNPC($2, $3, $1, $0)"));
    map.insert("putnpc2", placement(3, 0, 1, "this.level.putNPC($0, $1, $2)"));
    map.insert("putbomb", placement(3, 1, 2, "this.level.putBomb($1, $2, $0)"));
    map.insert("putexplosion", placement(3, 1, 2, "this.level.putExplosion($1, $2, $0)"));
    map.insert("putleaps", placement(3, 1, 2, "this.level.putLeaps($1, $2, $0)"));
    map.insert("putcomp", Builtin::Custom(builtin_putcomp));
    map.insert("putcomp2", Builtin::Custom(builtin_putcomp2));
    map.insert("lay", template(1, "this.level.putItem(this.x, this.y, $0)"));
    map.insert("lay2", placement(3, 1, 2, "this.level.putItem($1, $2, $0)"));
    map.insert("triggeraction", placement(3, 0, 1, "this.level.triggerAction($*)"));
    map.insert("testnpc", placement(2, 0, 1, "this.level.npcAt($0, $1)"));
    map.insert("onwall", placement(2, 0, 1, "this.level.onWall($0, $1)"));
    map.insert("updateboard", placement(4, 0, 1, "this.level.updateBoard($*)"));
    map.insert("setfocus", placement(2, 0, 1, "setFocus($0, $1)"));
    map.insert("move", template(3, "this.move($*)"));
    map.insert("shoot", template(6, "this.shoot($*)"));
    map.insert("callnpc", template(2, "this.level.npcs[$0].trigger($1)"));
    map.insert("callweapon", template(2, "player.weapons[$0].trigger($1)"));
}

/// Register functions acting on the contextual player
fn register_player_functions(map: &mut HashMap<&'static str, Builtin>) {
    map.insert("hurt", template(1, "this.hurtPlayer(player, $0)"));
    map.insert("setlevel", template(1, "player.setLevel($0)"));
    map.insert("setlevel2", template(3, "player.setLevel2($0, $1, $2)"));
    map.insert("serverwarp", template(1, "player.serverWarp($0)"));
    map.insert("addweapon", template(1, "player.addWeapon($0)"));
    map.insert("removeweapon", template(1, "player.removeWeapon($0)"));
    map.insert("hasweapon", template(1, "player.hasWeapon($0)"));
    map.insert("toweapons", template(1, "this.toWeapons($0)"));
    map.insert("join", template(1, "this.join($0)"));
    map.insert("carryobject", template(1, "player.carry($0)"));
    map.insert("throwcarry", template(0, "player.throwCarry()"));
    map.insert("freezeplayer", template(1, "player.freeze($0)"));
    map.insert("disableweapons", template(0, "player.disableWeapons()"));
    map.insert("enableweapons", template(0, "player.enableWeapons()"));
    map.insert("disabledefmovement", template(0, "player.disableMovement()"));
    map.insert("enabledefmovement", template(0, "player.enableMovement()"));
    map.insert("keydown", template(1, "keyDown($0)"));
    map.insert("sleep", template(1, "sleep($0)"));
}

/// Register math functions
fn register_math_functions(map: &mut HashMap<&'static str, Builtin>) {
    map.insert("abs", template(1, "abs($0)"));
    map.insert("sin", template(1, "sin($0)"));
    map.insert("cos", template(1, "cos($0)"));
    map.insert("arctan", template(1, "atan($0)"));
    map.insert("log", template(2, "log($0, $1)"));
    map.insert("exp", template(1, "exp($0)"));
    map.insert("int", template(1, "int($0)"));
    map.insert("min", template(2, "min($0, $1)"));
    map.insert("max", template(2, "max($0, $1)"));
    map.insert("random", template(2, "random($0, $1)"));
    map.insert("getangle", helper(2, "_getAngle"));
    map.insert("getdir", helper(2, "_getDir"));
    map.insert("vecx", helper(1, "_vecX"));
    map.insert("vecy", helper(1, "_vecY"));
}

impl Generator {
    /// Translate arguments in order
    pub(crate) fn render_args(&mut self, args: &[Expr], ctx: ExprCtx) -> Vec<String> {
        args.iter().map(|arg| self.expression(arg, ctx)).collect()
    }

    /// Translate an argument naming a variable; text arguments are taken
    /// literally
    pub(crate) fn variable(&mut self, arg: &Expr, ctx: ExprCtx) -> String {
        match arg {
            Expr::String(name) => qualify(name.trim()),
            other => self.expression(other, ctx),
        }
    }
}

fn qualify(name: &str) -> String {
    let root = name.split('.').next().unwrap_or(name);
    if name.contains('.') || is_root(root) {
        name.to_string()
    } else {
        format!("this.{}", name)
    }
}

/// `set flag;` sets a flag once and re-runs the dispatcher for the current
/// action, so conditions testing the flag see it
fn builtin_set(g: &mut Generator, args: &[Expr], ctx: ExprCtx) -> Option<String> {
    let flag = g.variable(args.first()?, ctx);
    let target = g.target();
    g.mark_dispatcher();

    Some(format!(
        "if (!{flag}) {{\n  {flag} = true;\n  this._actions({}, {}, {}, {});\n}}",
        target.action_name(),
        target.role_arg(ParamRole::Player),
        target.role_arg(ParamRole::Npc),
        target.role_arg(ParamRole::ChatText),
        flag = flag,
    ))
}

fn builtin_unset(g: &mut Generator, args: &[Expr], ctx: ExprCtx) -> Option<String> {
    let flag = g.variable(args.first()?, ctx);
    Some(format!("{} = false", flag))
}

fn builtin_setplayerprop(g: &mut Generator, args: &[Expr], ctx: ExprCtx) -> Option<String> {
    set_property(g, args, ctx, "player")
}

fn builtin_setcharprop(g: &mut Generator, args: &[Expr], ctx: ExprCtx) -> Option<String> {
    set_property(g, args, ctx, "this")
}

/// `setplayerprop #c, text;` assigns the property named by the code
fn set_property(g: &mut Generator, args: &[Expr], ctx: ExprCtx, owner: &str) -> Option<String> {
    let (Some(Expr::String(code)), Some(value)) = (args.first(), args.get(1)) else {
        return None;
    };
    let target = g.property_target(code, owner)?;
    let value = g.expression(value, ctx);
    Some(format!("{} = {}", target, value))
}

/// `playersays(text)` compares the chat text of a `playerchats` event
fn builtin_playersays(g: &mut Generator, args: &[Expr], ctx: ExprCtx) -> Option<String> {
    let said = g.expression(args.first()?, ctx);
    Some(match g.target() {
        Target::Event(action) if action.name == CHAT_ACTION => format!("text == {}", said),
        Target::Dispatcher | Target::Prologue => {
            format!("(_actionName == \"{}\" && text == {})", CHAT_ACTION, said)
        }
        _ => "false".to_string(),
    })
}

/// Baddy kinds by numeric type
const BADDY_TYPES: &[&str] = &[
    "graysoldier",
    "bluesoldier",
    "redsoldier",
    "shootingsoldier",
    "swampsoldier",
    "frog",
    "spider",
    "goldenwarrior",
    "lizardon",
    "dragon",
];

/// `putcomp type, x, y;`
fn builtin_putcomp(g: &mut Generator, args: &[Expr], ctx: ExprCtx) -> Option<String> {
    place_baddy(g, args, ctx, 3)
}

/// `putcomp2 type, x, y, power, mode;`
fn builtin_putcomp2(g: &mut Generator, args: &[Expr], ctx: ExprCtx) -> Option<String> {
    place_baddy(g, args, ctx, 5)
}

/// Both variants take the baddy type in the first slot, as a name or number
fn place_baddy(g: &mut Generator, args: &[Expr], ctx: ExprCtx, min_args: usize) -> Option<String> {
    if args.len() < min_args {
        return None;
    }

    let kind = baddy_type(g, &args[0], ctx);
    let coordinates = g.options().coordinates;
    let x = g.expression(&args[1], ctx);
    let y = g.expression(&args[2], ctx);

    let mut parts = vec![
        coordinates.tile_to_pixels(&x, Axis::X),
        coordinates.tile_to_pixels(&y, Axis::Y),
        kind,
    ];
    parts.extend(g.render_args(&args[3..], ctx));

    Some(format!("this.level.putBaddy({})", parts.join(", ")))
}

fn baddy_type(g: &mut Generator, arg: &Expr, ctx: ExprCtx) -> String {
    let probe = match arg {
        Expr::Identifier(name) | Expr::String(name) => BADDY_TYPES
            .iter()
            .position(|kind| kind.eq_ignore_ascii_case(name.trim())),
        _ => None,
    };

    match probe {
        Some(index) => index.to_string(),
        None => g.expression(arg, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gs1::parse_expression;
    use crate::tables::prototypes::PROTOTYPES;
    use crate::tables::{lookup_action, lookup_prototype};
    use gs1conv_core::{ConvertOptions, CoordinateMode};

    fn render(src: &str) -> String {
        render_with(src, ConvertOptions::default())
    }

    fn render_with(src: &str, options: ConvertOptions) -> String {
        let mut gen = Generator::new(options);
        let expr = parse_expression(src).unwrap();
        gen.expression(&expr, ExprCtx::default())
    }

    fn global() -> ConvertOptions {
        ConvertOptions {
            coordinates: CoordinateMode::Global,
            ..ConvertOptions::default()
        }
    }

    #[test]
    fn test_every_builtin_has_prototype() {
        let builtins = Builtins::new();
        for name in builtins.names() {
            assert!(lookup_prototype(name).is_some(), "missing prototype for {}", name);
        }
        for proto in PROTOTYPES {
            assert!(builtins.get(proto.name).is_some(), "no built-in for {}", proto.name);
        }
        assert!(builtins.len() >= 90);
    }

    #[test]
    fn test_fill() {
        let args = vec!["1".to_string(), "this.gx".to_string()];
        assert_eq!(fill("f($1, $0) g($*) $$", &args), "f(this.gx, 1) g(1, this.gx) $$");
        assert_eq!(fill("h($5)", &args), "h()");
    }

    #[test]
    fn test_templates() {
        assert_eq!(render("hurt(5)"), "this.hurtPlayer(player, 5)");
        assert_eq!(render("setimg(door.png)"), "this.image = \"door.png\"");
        assert_eq!(render("hide()"), "this.hide()");
        assert_eq!(render("arctan(1)"), "atan(1)");
    }

    #[test]
    fn test_too_few_args_falls_back() {
        assert_eq!(render("hurt()"), "this.hurt()");
        assert_eq!(render("setplayerprop(#c)"), "player.setplayerprop(this.chat)");
    }

    #[test]
    fn test_placement_local() {
        assert_eq!(
            render("putbomb(1, 3, y)"),
            "this.level.putBomb(48 + this.level.x, this.gy*16 + this.level.y, 1)"
        );
    }

    #[test]
    fn test_placement_global() {
        assert_eq!(
            render_with("putbomb(1, 3, y + 1)", global()),
            "this.level.putBomb(48, (this.gy + 1)*16, 1)"
        );
    }

    #[test]
    fn test_putcomp_type_probe() {
        assert_eq!(render_with("putcomp(frog, 1, 2)", global()), "this.level.putBaddy(16, 32, 5)");
        assert_eq!(
            render_with("putcomp2(kind, 1, 2, 3, 0)", global()),
            "this.level.putBaddy(16, 32, this.kind, 3, 0)"
        );
        assert_eq!(render_with("putcomp2(dragon, 0, 0, 3, 0)", global()), "this.level.putBaddy(0, 0, 9, 3, 0)");
    }

    #[test]
    fn test_string_list_functions() {
        assert_eq!(render("addstring(list, x)"), "this.list.add(\"x\")");
        assert_eq!(render("setstring(client.name, hi)"), "client.name = \"hi\"");
        assert_eq!(render("replacestring(list, 1, b)"), "this.list[1] = \"b\"");
    }

    #[test]
    fn test_property_assignment() {
        assert_eq!(render("setplayerprop(#c, Hello #n)"), "player.chat = \"Hello \" $ this.nick");
        assert_eq!(render("setcharprop(#P1, x)"), "this.attr[1] = \"x\"");
    }

    #[test]
    fn test_helper_backed_functions() {
        let mut gen = Generator::new(ConvertOptions::default());
        let expr = parse_expression("getangle(1, 2) + getangle(3, 4)").unwrap();
        assert_eq!(
            gen.expression(&expr, ExprCtx::default()),
            "this._getAngle(1, 2) + this._getAngle(3, 4)"
        );
        assert_eq!(gen.helpers(), &["_getAngle"]);
    }

    #[test]
    fn test_set_flag() {
        let mut gen = Generator::new(ConvertOptions::default());
        gen.set_target(Target::Event(lookup_action("playerenters").unwrap()), 1);
        let expr = parse_expression("set(\"flag1\")").unwrap();
        assert_eq!(
            gen.expression(&expr, ExprCtx::default()),
            "if (!this.flag1) {\n  this.flag1 = true;\n  this._actions(\"playerenters\", player, null, null);\n}"
        );
        assert!(gen.dispatcher_referenced());
    }

    #[test]
    fn test_unset_flag() {
        assert_eq!(render("unset(flag1)"), "this.flag1 = false");
    }

    #[test]
    fn test_playersays_by_target() {
        let mut gen = Generator::new(ConvertOptions::default());
        let expr = parse_expression("playersays(hi)").unwrap();

        gen.set_target(Target::Event(lookup_action("playerchats").unwrap()), 1);
        assert_eq!(gen.expression(&expr, ExprCtx::condition()), "text == \"hi\"");

        gen.set_target(Target::Dispatcher, 1);
        assert_eq!(
            gen.expression(&expr, ExprCtx::condition()),
            "(_actionName == \"playerchats\" && text == \"hi\")"
        );

        gen.set_target(Target::Event(lookup_action("timeout").unwrap()), 1);
        assert_eq!(gen.expression(&expr, ExprCtx::condition()), "false");
    }
}
