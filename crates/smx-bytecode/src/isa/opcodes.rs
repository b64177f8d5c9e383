//! Opcode table.
//!
//! The whole instruction set is declared once in [`opcodes!`]; the enum,
//! its conversions and every per-opcode lookup are generated from that
//! single declaration.

use serde::Serialize;

/// Number of real opcodes. Ordinals at or above this are not instructions.
pub const OPCODE_COUNT: u32 = 192;

/// How an operand cell is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum OperandKind {
    /// Raw value, printed as signed decimal.
    Constant,
    /// Frame-relative offset, printed as hex, never relocated.
    StackOffset,
    /// Code-relative branch target.
    JumpTarget,
    /// Code-relative call target.
    FunctionTarget,
    /// Index into the native import table, printed as hex.
    NativeIndex,
    /// Data-relative address.
    DataAddress,
}

impl OperandKind {
    /// Whether the raw value is an offset into the code segment.
    pub fn is_code_relative(self) -> bool {
        matches!(self, Self::JumpTarget | Self::FunctionTarget)
    }
}

macro_rules! opcodes {
    ($($variant:ident = $code:literal, $mnem:literal, $cells:literal, [$($kind:ident),*];)*) => {
        /// Instruction opcode.
        ///
        /// `Case` is a pseudo-opcode describing one entry of a case table;
        /// it never appears as an instruction word.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[repr(u32)]
        pub enum Opcode {
            $($variant = $code,)*
        }

        impl Opcode {
            /// Every opcode in ordinal order, `Case` last.
            pub const ALL: &'static [Opcode] = &[$(Opcode::$variant,)*];

            pub fn from_u32(raw: u32) -> Option<Self> {
                match raw {
                    $($code => Some(Self::$variant),)*
                    _ => None,
                }
            }

            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Self::$variant => $mnem,)*
                }
            }

            /// Encoded length in cells, opcode cell included.
            ///
            /// Zero for opcodes the compiler never generates. For `CaseTbl`
            /// this is the header length only; see [`crate::decode`].
            pub fn cells(self) -> u32 {
                match self {
                    $(Self::$variant => $cells,)*
                }
            }

            pub fn operands(self) -> &'static [OperandKind] {
                match self {
                    $(Self::$variant => &[$(OperandKind::$kind),*],)*
                }
            }
        }
    };
}

opcodes! {
    None = 0, "none", 1, [];
    LoadPri = 1, "load.pri", 2, [Constant];
    LoadAlt = 2, "load.alt", 2, [Constant];
    LoadSPri = 3, "load.s.pri", 2, [StackOffset];
    LoadSAlt = 4, "load.s.alt", 2, [StackOffset];
    LrefPri = 5, "lref.pri", 0, [];
    LrefAlt = 6, "lref.alt", 0, [];
    LrefSPri = 7, "lref.s.pri", 2, [StackOffset];
    LrefSAlt = 8, "lref.s.alt", 2, [StackOffset];
    LoadI = 9, "load.i", 1, [];
    LodbI = 10, "lodb.i", 2, [Constant];
    ConstPri = 11, "const.pri", 2, [Constant];
    ConstAlt = 12, "const.alt", 2, [Constant];
    AddrPri = 13, "addr.pri", 2, [StackOffset];
    AddrAlt = 14, "addr.alt", 2, [StackOffset];
    StorPri = 15, "stor.pri", 2, [Constant];
    StorAlt = 16, "stor.alt", 2, [Constant];
    StorSPri = 17, "stor.s.pri", 2, [StackOffset];
    StorSAlt = 18, "stor.s.alt", 2, [StackOffset];
    SrefPri = 19, "sref.pri", 0, [];
    SrefAlt = 20, "sref.alt", 0, [];
    SrefSPri = 21, "sref.s.pri", 2, [StackOffset];
    SrefSAlt = 22, "sref.s.alt", 2, [StackOffset];
    StorI = 23, "stor.i", 1, [];
    StrbI = 24, "strb.i", 2, [Constant];
    Lidx = 25, "lidx", 1, [];
    LidxB = 26, "lidx.b", 2, [Constant];
    Idxaddr = 27, "idxaddr", 1, [];
    IdxaddrB = 28, "idxaddr.b", 2, [Constant];
    AlignPri = 29, "align.pri", 0, [];
    AlignAlt = 30, "align.alt", 0, [];
    Lctrl = 31, "lctrl", 0, [];
    Sctrl = 32, "sctrl", 0, [];
    MovePri = 33, "move.pri", 1, [];
    MoveAlt = 34, "move.alt", 1, [];
    Xchg = 35, "xchg", 1, [];
    PushPri = 36, "push.pri", 1, [];
    PushAlt = 37, "push.alt", 1, [];
    PushR = 38, "push.r", 0, [];
    PushC = 39, "push.c", 2, [Constant];
    Push = 40, "push", 2, [DataAddress];
    PushS = 41, "push.s", 2, [StackOffset];
    PopPri = 42, "pop.pri", 1, [];
    PopAlt = 43, "pop.alt", 1, [];
    Stack = 44, "stack", 2, [Constant];
    Heap = 45, "heap", 2, [Constant];
    Proc = 46, "proc", 1, [];
    Ret = 47, "ret", 0, [];
    Retn = 48, "retn", 1, [];
    Call = 49, "call", 2, [FunctionTarget];
    CallPri = 50, "call.pri", 0, [];
    Jump = 51, "jump", 2, [JumpTarget];
    Jrel = 52, "jrel", 0, [];
    Jzer = 53, "jzer", 2, [JumpTarget];
    Jnz = 54, "jnz", 2, [JumpTarget];
    Jeq = 55, "jeq", 2, [JumpTarget];
    Jneq = 56, "jneq", 2, [JumpTarget];
    Jless = 57, "jless", 0, [];
    Jleq = 58, "jleq", 0, [];
    Jgrtr = 59, "jgrtr", 0, [];
    Jgeq = 60, "jgeq", 0, [];
    Jsless = 61, "jsless", 2, [JumpTarget];
    Jsleq = 62, "jsleq", 2, [JumpTarget];
    Jsgrtr = 63, "jsgrtr", 2, [JumpTarget];
    Jsgeq = 64, "jsgeq", 2, [JumpTarget];
    Shl = 65, "shl", 1, [];
    Shr = 66, "shr", 1, [];
    Sshr = 67, "sshr", 1, [];
    ShlCPri = 68, "shl.c.pri", 2, [Constant];
    ShlCAlt = 69, "shl.c.alt", 2, [Constant];
    ShrCPri = 70, "shr.c.pri", 2, [Constant];
    ShrCAlt = 71, "shr.c.alt", 2, [Constant];
    Smul = 72, "smul", 1, [];
    Sdiv = 73, "sdiv", 1, [];
    SdivAlt = 74, "sdiv.alt", 1, [];
    Umul = 75, "umul", 0, [];
    Udiv = 76, "udiv", 0, [];
    UdivAlt = 77, "udiv.alt", 0, [];
    Add = 78, "add", 1, [];
    Sub = 79, "sub", 1, [];
    SubAlt = 80, "sub.alt", 1, [];
    And = 81, "and", 1, [];
    Or = 82, "or", 1, [];
    Xor = 83, "xor", 1, [];
    Not = 84, "not", 1, [];
    Neg = 85, "neg", 1, [];
    Invert = 86, "invert", 1, [];
    AddC = 87, "add.c", 2, [Constant];
    SmulC = 88, "smul.c", 2, [Constant];
    ZeroPri = 89, "zero.pri", 1, [];
    ZeroAlt = 90, "zero.alt", 1, [];
    Zero = 91, "zero", 2, [DataAddress];
    ZeroS = 92, "zero.s", 2, [StackOffset];
    SignPri = 93, "sign.pri", 0, [];
    SignAlt = 94, "sign.alt", 0, [];
    Eq = 95, "eq", 1, [];
    Neq = 96, "neq", 1, [];
    Less = 97, "less", 0, [];
    Leq = 98, "leq", 0, [];
    Grtr = 99, "grtr", 0, [];
    Geq = 100, "geq", 0, [];
    Sless = 101, "sless", 1, [];
    Sleq = 102, "sleq", 1, [];
    Sgrtr = 103, "sgrtr", 1, [];
    Sgeq = 104, "sgeq", 1, [];
    EqCPri = 105, "eq.c.pri", 2, [Constant];
    EqCAlt = 106, "eq.c.alt", 2, [Constant];
    IncPri = 107, "inc.pri", 1, [];
    IncAlt = 108, "inc.alt", 1, [];
    Inc = 109, "inc", 2, [DataAddress];
    IncS = 110, "inc.s", 2, [StackOffset];
    IncI = 111, "inc.i", 1, [];
    DecPri = 112, "dec.pri", 1, [];
    DecAlt = 113, "dec.alt", 1, [];
    Dec = 114, "dec", 2, [DataAddress];
    DecS = 115, "dec.s", 2, [StackOffset];
    DecI = 116, "dec.i", 1, [];
    Movs = 117, "movs", 2, [Constant];
    Cmps = 118, "cmps", 0, [];
    Fill = 119, "fill", 2, [Constant];
    Halt = 120, "halt", 2, [Constant];
    Bounds = 121, "bounds", 2, [Constant];
    SysreqPri = 122, "sysreq.pri", 0, [];
    SysreqC = 123, "sysreq.c", 2, [NativeIndex];
    File = 124, "file", 0, [];
    Line = 125, "line", 0, [];
    Symbol = 126, "symbol", 0, [];
    Srange = 127, "srange", 0, [];
    JumpPri = 128, "jump.pri", 0, [];
    Switch = 129, "switch", 2, [JumpTarget];
    CaseTbl = 130, "casetbl", 3, [Constant, JumpTarget];
    SwapPri = 131, "swap.pri", 1, [];
    SwapAlt = 132, "swap.alt", 1, [];
    PushAdr = 133, "push.adr", 2, [StackOffset];
    Nop = 134, "nop", 1, [];
    SysreqN = 135, "sysreq.n", 3, [NativeIndex, Constant];
    Symtag = 136, "symtag", 0, [];
    Break = 137, "break", 1, [];
    Push2C = 138, "push2.c", 3, [Constant, Constant];
    Push2 = 139, "push2", 3, [DataAddress, DataAddress];
    Push2S = 140, "push2.s", 3, [StackOffset, StackOffset];
    Push2Adr = 141, "push2.adr", 3, [StackOffset, StackOffset];
    Push3C = 142, "push3.c", 4, [Constant, Constant, Constant];
    Push3 = 143, "push3", 4, [DataAddress, DataAddress, DataAddress];
    Push3S = 144, "push3.s", 4, [StackOffset, StackOffset, StackOffset];
    Push3Adr = 145, "push3.adr", 4, [StackOffset, StackOffset, StackOffset];
    Push4C = 146, "push4.c", 5, [Constant, Constant, Constant, Constant];
    Push4 = 147, "push4", 5, [DataAddress, DataAddress, DataAddress, DataAddress];
    Push4S = 148, "push4.s", 5, [StackOffset, StackOffset, StackOffset, StackOffset];
    Push4Adr = 149, "push4.adr", 5, [StackOffset, StackOffset, StackOffset, StackOffset];
    Push5C = 150, "push5.c", 6, [Constant, Constant, Constant, Constant, Constant];
    Push5 = 151, "push5", 6, [DataAddress, DataAddress, DataAddress, DataAddress, DataAddress];
    Push5S = 152, "push5.s", 6, [StackOffset, StackOffset, StackOffset, StackOffset, StackOffset];
    Push5Adr = 153, "push5.adr", 6, [StackOffset, StackOffset, StackOffset, StackOffset, StackOffset];
    LoadBoth = 154, "load.both", 3, [Constant, Constant];
    LoadSBoth = 155, "load.s.both", 3, [StackOffset, StackOffset];
    Const = 156, "const", 3, [DataAddress, Constant];
    ConstS = 157, "const.s", 3, [StackOffset, Constant];
    SysreqD = 158, "sysreq.d", 0, [];
    SysreqNd = 159, "sysreq.nd", 0, [];
    TrackerPushC = 160, "trk.push.c", 2, [Constant];
    TrackerPopSetheap = 161, "trk.pop", 1, [];
    Genarray = 162, "genarray", 2, [Constant];
    GenarrayZ = 163, "genarray.z", 2, [Constant];
    StradjustPri = 164, "stradjust.pri", 1, [];
    Stackadjust = 165, "stackadjust", 0, [];
    Endproc = 166, "endproc", 1, [];
    LdgfnPri = 167, "ldgfn.pri", 0, [];
    Rebase = 168, "rebase", 4, [DataAddress, Constant, Constant];
    InitarrayPri = 169, "initarray.pri", 6, [DataAddress, Constant, Constant, Constant, Constant];
    InitarrayAlt = 170, "initarray.alt", 6, [DataAddress, Constant, Constant, Constant, Constant];
    HeapSave = 171, "heap.save", 1, [];
    HeapRestore = 172, "heap.restore", 1, [];
    FirstFake = 173, "firstfake", 0, [];
    Fabs = 174, "fabs", 1, [];
    Float = 175, "float", 1, [];
    FloatAdd = 176, "float.add", 1, [];
    FloatSub = 177, "float.sub", 1, [];
    FloatMul = 178, "float.mul", 1, [];
    FloatDiv = 179, "float.div", 1, [];
    RndToNearest = 180, "round", 1, [];
    RndToFloor = 181, "floor", 1, [];
    RndToCeil = 182, "ceil", 1, [];
    RndToZero = 183, "rndtozero", 1, [];
    FloatCmp = 184, "float.cmp", 1, [];
    FloatGt = 185, "float.gt", 1, [];
    FloatGe = 186, "float.ge", 1, [];
    FloatLt = 187, "float.lt", 1, [];
    FloatLe = 188, "float.le", 1, [];
    FloatNe = 189, "float.ne", 1, [];
    FloatEq = 190, "float.eq", 1, [];
    FloatNot = 191, "float.not", 1, [];
    Case = 255, "case", 3, [Constant, JumpTarget];
}

impl Opcode {
    /// Whether the compiler emits this opcode. Ungenerated opcodes have no
    /// defined encoding length.
    pub fn is_generated(self) -> bool {
        self.cells() != 0
    }

    /// Conditional jumps taking one code-relative target.
    pub fn is_conditional_jump(self) -> bool {
        matches!(
            self,
            Self::Jzer
                | Self::Jnz
                | Self::Jeq
                | Self::Jneq
                | Self::Jsless
                | Self::Jsleq
                | Self::Jsgrtr
                | Self::Jsgeq
        )
    }
}

/// Mnemonic for a raw opcode word, `"unknown"` if it names no opcode.
pub fn mnemonic(raw: u32) -> &'static str {
    Opcode::from_u32(raw).map_or("unknown", Opcode::mnemonic)
}

/// Table length in cells for a raw opcode word, 1 if it names no opcode.
pub fn fixed_cells(raw: u32) -> u32 {
    Opcode::from_u32(raw).map_or(1, Opcode::cells)
}

/// Operand kinds for a raw opcode word, empty if it names no opcode.
pub fn operand_kinds(raw: u32) -> &'static [OperandKind] {
    match Opcode::from_u32(raw) {
        Some(op) => op.operands(),
        None => &[],
    }
}
