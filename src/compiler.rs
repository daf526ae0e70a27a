//! Single-pass bytecode compiler.
//!
//! Two deliberate departures from the C original surveyed in
//! `original_source/` are recorded here rather than reproduced: the `FOR`
//! loop there increments and jumps back unconditionally, with no
//! termination test and no support for a `BY` step, which simply never
//! terminates for a descending range; and `CASE` is not compiled at all.
//! Both are implemented properly below.

use std::collections::HashMap;

use crate::ast::{BinaryOp, CaseBranch, Expr, Program as AstProgram, Stmt, StmtKind, UnaryOp, VarDecl};
use crate::builtins;
use crate::bytecode::{CompiledVar, Instruction, Opcode, Program};
use crate::consts::MAX_VARIABLES;
use crate::error::{BindingError, CompileError};
use crate::value::DataType;

/// Compiles a parsed [`AstProgram`] into a [`Program`], or the first
/// compile error encountered.
pub fn compile(ast: &AstProgram) -> Result<Program, CompileError> {
    let mut compiler = Compiler::new(ast.name.clone());
    compiler.declare_symbols(&ast.variables)?;
    compiler.emit_initializers(&ast.variables);
    compiler.body_start = compiler.instructions.len() as u32;
    compiler.compile_block(&ast.body)?;
    compiler.emit(Opcode::Halt, 0);
    compiler.finish()
}

/// Tracks break targets (`EXIT`) and, for `FOR`/`WHILE`/`REPEAT`, nothing
/// else: the loop condition re-check is compiled inline at each loop's own
/// back-edge, so only the exit patch list needs to survive across nested
/// loops.
struct LoopContext {
    break_patches: Vec<usize>,
}

struct Compiler {
    name: String,
    symbols: HashMap<String, u16>,
    variables: Vec<CompiledVar>,
    instructions: Vec<Instruction>,
    loops: Vec<LoopContext>,
    instance_counts: HashMap<String, u16>,
    body_start: u32,
    error: Option<CompileError>,
}

impl Compiler {
    fn new(name: String) -> Self {
        Compiler {
            name,
            symbols: HashMap::new(),
            variables: Vec::new(),
            instructions: Vec::new(),
            loops: Vec::new(),
            instance_counts: HashMap::new(),
            body_start: 0,
            error: None,
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(CompileError::new(message, 0));
        }
    }

    fn fail_at(&mut self, message: impl Into<String>, line: u32) {
        if self.error.is_none() {
            self.error = Some(CompileError::new(message, line));
        }
    }

    fn finish(mut self) -> Result<Program, CompileError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        Ok(Program {
            name: self.name,
            variables: self.variables,
            instructions: self.instructions,
            body_start: self.body_start,
        })
    }

    // -----------------------------------------------------------------
    // Symbol table
    // -----------------------------------------------------------------

    fn declare_symbols(&mut self, decls: &[VarDecl]) -> Result<(), CompileError> {
        for decl in decls {
            self.add_symbol(&decl.name, decl.data_type, decl.is_input, decl.is_output, false)?;
        }
        Ok(())
    }

    fn add_symbol(
        &mut self,
        name: &str,
        data_type: DataType,
        is_input: bool,
        is_output: bool,
        hidden: bool,
    ) -> Result<u16, CompileError> {
        if let Some(&idx) = self.symbols.get(name) {
            return Ok(idx);
        }
        if self.variables.len() >= MAX_VARIABLES {
            return Err(CompileError::new(format!("too many variables (max {MAX_VARIABLES})"), 0));
        }
        let idx = self.variables.len() as u16;
        self.variables.push(CompiledVar {
            name: name.to_string(),
            data_type,
            is_input,
            is_output,
            hidden,
        });
        self.symbols.insert(name.to_string(), idx);
        Ok(idx)
    }

    /// Allocates a compiler-private slot (FOR end value, CASE scrutinee)
    /// that never collides with a source identifier and is not exposed to
    /// bindings.
    fn alloc_hidden_slot(&mut self, hint: &str) -> u16 {
        let name = format!("__hidden_{hint}_{}", self.variables.len());
        match self.add_symbol(&name, DataType::Dint, false, false, true) {
            Ok(idx) => idx,
            Err(_) => {
                self.fail(format!("too many variables (max {MAX_VARIABLES})"));
                0
            }
        }
    }

    /// Emits `PushX ...; PopVar idx` for every declared variable with an
    /// explicit initial value, run once before the program body on every
    /// `upload`.
    fn emit_initializers(&mut self, decls: &[VarDecl]) {
        for decl in decls {
            let Some(value) = decl.initial_value else { continue };
            self.compile_literal(value);
            let idx = self.symbols[&decl.name];
            self.emit(Opcode::PopVar, idx as i32);
        }
    }

    fn resolve_var(&mut self, name: &str, line: u32) -> u16 {
        match self.symbols.get(name) {
            Some(&idx) => idx,
            None => {
                self.fail_at(BindingError::UnknownVariable(name.to_string()).to_string(), line);
                0
            }
        }
    }

    // -----------------------------------------------------------------
    // Emission helpers
    // -----------------------------------------------------------------

    fn emit(&mut self, opcode: Opcode, imm: i32) -> usize {
        let pc = self.instructions.len();
        self.instructions.push(Instruction::with_imm(opcode, imm));
        pc
    }

    /// Emits a jump with a placeholder target and returns its instruction
    /// index, to be fixed up later by [`Self::patch_jump`].
    fn emit_jump(&mut self, opcode: Opcode) -> usize {
        self.emit(opcode, -1)
    }

    fn patch_jump(&mut self, at: usize) {
        let target = self.instructions.len() as i32;
        self.instructions[at].imm = target;
    }

    fn patch_jump_to(&mut self, at: usize, target: usize) {
        self.instructions[at].imm = target as i32;
    }

    // -----------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------

    fn compile_block(&mut self, stmts: &[Stmt]) -> Result<(), CompileError> {
        for stmt in stmts {
            self.compile_stmt(stmt);
            if self.error.is_some() {
                break;
            }
        }
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn compile_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Assign { name, expr } => self.compile_assign(name, expr, stmt.line),
            StmtKind::If { cond, then_body, else_body } => self.compile_if(cond, then_body, else_body, stmt.line),
            StmtKind::Case { expr, branches, else_body } => self.compile_case(expr, branches, else_body, stmt.line),
            StmtKind::For { var, start, end, step, body } => {
                self.compile_for(var, start, end, step.as_ref(), body, stmt.line)
            }
            StmtKind::While { cond, body } => self.compile_while(cond, body, stmt.line),
            StmtKind::Repeat { body, until } => self.compile_repeat(body, until, stmt.line),
            StmtKind::Exit => self.compile_exit(stmt.line),
            StmtKind::RemoteWrite { func_name, slave_id, address, value } => {
                self.compile_remote_write(func_name, slave_id, address, value, stmt.line)
            }
        }
    }

    /// `MB_WRITE_COIL(slave_id, addr) := value;` compiles to the same
    /// `CallBuiltin` a normal 3-argument call to that name would, but the
    /// return value has nowhere to go — the statement has no assignment
    /// target — so it is discarded with `Pop` instead of `PopVar` (spec
    /// §3, `ST_AST_REMOTE_WRITE`).
    fn compile_remote_write(&mut self, func_name: &str, slave_id: &Expr, address: &Expr, value: &Expr, line: u32) {
        self.compile_call(func_name, &[slave_id.clone(), address.clone(), value.clone()], line);
        self.emit(Opcode::Pop, 0);
    }

    fn compile_assign(&mut self, name: &str, expr: &Expr, line: u32) {
        self.compile_expr(expr, line);
        let idx = self.resolve_var(name, line);
        self.emit(Opcode::PopVar, idx as i32);
    }

    fn compile_if(&mut self, cond: &Expr, then_body: &[Stmt], else_body: &[Stmt], line: u32) {
        self.compile_expr(cond, line);
        let else_jump = self.emit_jump(Opcode::JmpIfFalse);
        for stmt in then_body {
            self.compile_stmt(stmt);
        }
        if else_body.is_empty() {
            self.patch_jump(else_jump);
        } else {
            let end_jump = self.emit_jump(Opcode::Jmp);
            self.patch_jump(else_jump);
            for stmt in else_body {
                self.compile_stmt(stmt);
            }
            self.patch_jump(end_jump);
        }
    }

    /// Compiles the scrutinee once into a hidden slot, then emits each
    /// branch as an equality test against that slot: the
    /// alternative of re-evaluating the scrutinee expression per branch
    /// would duplicate any side effects a builtin call inside it has.
    fn compile_case(&mut self, expr: &Expr, branches: &[CaseBranch], else_body: &[Stmt], line: u32) {
        self.compile_expr(expr, line);
        let scrutinee = self.alloc_hidden_slot("case");
        self.emit(Opcode::PopVar, scrutinee as i32);

        let mut end_jumps = Vec::new();
        for branch in branches {
            self.emit(Opcode::PushVar, scrutinee as i32);
            self.emit(Opcode::PushDint, branch.value);
            self.emit(Opcode::Eq, 0);
            let skip = self.emit_jump(Opcode::JmpIfFalse);
            for stmt in &branch.body {
                self.compile_stmt(stmt);
            }
            end_jumps.push(self.emit_jump(Opcode::Jmp));
            self.patch_jump(skip);
        }
        for stmt in else_body {
            self.compile_stmt(stmt);
        }
        for jump in end_jumps {
            self.patch_jump(jump);
        }
        let _ = line;
    }

    /// Compiles `FOR var := start TO end BY step DO body END_FOR`.
    ///
    /// The end value is evaluated once into a hidden slot so a
    /// non-constant bound is not re-evaluated every iteration. `step`
    /// defaults to `+1`; a negative constant step is honoured by choosing
    /// the termination test's direction from the step's sign. The test
    /// runs *before* each iteration (including the first), so a loop whose
    /// bound is already satisfied at entry runs zero times.
    fn compile_for(&mut self, var: &str, start: &Expr, end: &Expr, step: Option<&Expr>, body: &[Stmt], line: u32) {
        let step_value = match step {
            Some(Expr::Literal(v)) => v.as_i64() as i32,
            Some(Expr::Unary { op: UnaryOp::Neg, operand }) => match operand.as_ref() {
                Expr::Literal(v) => -(v.as_i64() as i32),
                _ => {
                    self.fail_at("FOR step (BY clause) must be a constant", line);
                    1
                }
            },
            Some(_) => {
                self.fail_at("FOR step (BY clause) must be a constant", line);
                1
            }
            None => 1,
        };
        if step_value == 0 {
            self.fail_at("FOR step (BY clause) must not be zero", line);
            return;
        }

        self.compile_expr(start, line);
        let var_idx = self.resolve_var(var, line);
        self.emit(Opcode::PopVar, var_idx as i32);

        self.compile_expr(end, line);
        let end_slot = self.alloc_hidden_slot("for_end");
        self.emit(Opcode::PopVar, end_slot as i32);

        let test_pc = self.instructions.len();
        self.emit(Opcode::PushVar, var_idx as i32);
        self.emit(Opcode::PushVar, end_slot as i32);
        let cmp_op = if step_value > 0 { Opcode::Le } else { Opcode::Ge };
        self.emit(cmp_op, 0);
        let exit_jump = self.emit_jump(Opcode::JmpIfFalse);

        self.loops.push(LoopContext { break_patches: Vec::new() });
        for stmt in body {
            self.compile_stmt(stmt);
        }
        let ctx = self.loops.pop().expect("pushed above");

        self.emit(Opcode::PushVar, var_idx as i32);
        self.emit(Opcode::PushInt, step_value);
        self.emit(Opcode::Add, 0);
        self.emit(Opcode::PopVar, var_idx as i32);
        let back = self.emit_jump(Opcode::Jmp);
        self.patch_jump_to(back, test_pc);

        self.patch_jump(exit_jump);
        for patch in ctx.break_patches {
            self.patch_jump(patch);
        }
    }

    fn compile_while(&mut self, cond: &Expr, body: &[Stmt], line: u32) {
        let test_pc = self.instructions.len();
        self.compile_expr(cond, line);
        let exit_jump = self.emit_jump(Opcode::JmpIfFalse);

        self.loops.push(LoopContext { break_patches: Vec::new() });
        for stmt in body {
            self.compile_stmt(stmt);
        }
        let ctx = self.loops.pop().expect("pushed above");

        let back = self.emit_jump(Opcode::Jmp);
        self.patch_jump_to(back, test_pc);
        self.patch_jump(exit_jump);
        for patch in ctx.break_patches {
            self.patch_jump(patch);
        }
    }

    fn compile_repeat(&mut self, body: &[Stmt], until: &Expr, line: u32) {
        let body_pc = self.instructions.len();

        self.loops.push(LoopContext { break_patches: Vec::new() });
        for stmt in body {
            self.compile_stmt(stmt);
        }
        let ctx = self.loops.pop().expect("pushed above");

        self.compile_expr(until, line);
        let back = self.emit_jump(Opcode::JmpIfFalse);
        self.patch_jump_to(back, body_pc);
        for patch in ctx.break_patches {
            self.patch_jump(patch);
        }
    }

    fn compile_exit(&mut self, line: u32) {
        if self.loops.is_empty() {
            self.fail_at("EXIT used outside of a loop", line);
            return;
        }
        let jump = self.emit_jump(Opcode::Jmp);
        self.loops.last_mut().expect("checked above").break_patches.push(jump);
    }

    // -----------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------

    fn compile_expr(&mut self, expr: &Expr, line: u32) {
        match expr {
            Expr::Literal(value) => self.compile_literal(*value),
            Expr::Variable(name) => {
                let idx = self.resolve_var(name, line);
                self.emit(Opcode::PushVar, idx as i32);
            }
            Expr::Unary { op, operand } => {
                self.compile_expr(operand, line);
                let opcode = match op {
                    UnaryOp::Neg => Opcode::Neg,
                    UnaryOp::Not => Opcode::Not,
                };
                self.emit(opcode, 0);
            }
            Expr::Binary { op, lhs, rhs } => {
                self.compile_expr(lhs, line);
                self.compile_expr(rhs, line);
                self.emit(binary_opcode(*op), 0);
            }
            Expr::Call { name, args } => self.compile_call(name, args, line),
        }
    }

    fn compile_literal(&mut self, value: crate::value::Value) {
        use crate::value::Value;
        match value {
            Value::Bool(b) => {
                self.emit(Opcode::PushBool, b as i32);
            }
            Value::Int(n) => {
                self.emit(Opcode::PushInt, n as i32);
            }
            Value::Dint(n) => {
                self.emit(Opcode::PushDint, n);
            }
            Value::Dword(n) => {
                self.emit(Opcode::PushDword, n as i32);
            }
            Value::Real(f) => {
                self.emit(Opcode::PushReal, f.to_bits() as i32);
            }
        }
    }

    fn compile_call(&mut self, name: &str, args: &[Expr], line: u32) {
        let Some(descriptor) = builtins::lookup(name) else {
            self.fail_at(format!("unknown function: {name}"), line);
            return;
        };
        if args.len() != descriptor.arity {
            self.fail_at(
                format!("{name} expects {} argument(s), got {}", descriptor.arity, args.len()),
                line,
            );
            return;
        }
        for arg in args {
            self.compile_expr(arg, line);
        }
        let instance_id = if descriptor.stateful {
            let id = self.next_instance_id(descriptor.pool);
            if id as usize >= crate::consts::MAX_INSTANCES_PER_POOL {
                self.fail_at(format!("too many {:?} instances (max {})", descriptor.pool, crate::consts::MAX_INSTANCES_PER_POOL), line);
                return;
            }
            id
        } else {
            u16::MAX
        };
        self.emit(Opcode::CallBuiltin, Instruction::call_builtin(descriptor.id, instance_id).imm);
    }

    /// Each textual occurrence of a stateful builtin gets its own instance
    /// id, assigned in source order.
    fn next_instance_id(&mut self, pool: builtins::Pool) -> u16 {
        let key = format!("{pool:?}");
        let count = self.instance_counts.entry(key).or_insert(0);
        let id = *count;
        *count += 1;
        id
    }
}

fn binary_opcode(op: BinaryOp) -> Opcode {
    match op {
        BinaryOp::Add => Opcode::Add,
        BinaryOp::Sub => Opcode::Sub,
        BinaryOp::Mul => Opcode::Mul,
        BinaryOp::Div => Opcode::Div,
        BinaryOp::Mod => Opcode::Mod,
        BinaryOp::And => Opcode::And,
        BinaryOp::Or => Opcode::Or,
        BinaryOp::Xor => Opcode::Xor,
        BinaryOp::Shl => Opcode::Shl,
        BinaryOp::Shr => Opcode::Shr,
        BinaryOp::Eq => Opcode::Eq,
        BinaryOp::Ne => Opcode::Ne,
        BinaryOp::Lt => Opcode::Lt,
        BinaryOp::Gt => Opcode::Gt,
        BinaryOp::Le => Opcode::Le,
        BinaryOp::Ge => Opcode::Ge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn compile_src(src: &str) -> Program {
        let ast = parser::parse(src).unwrap_or_else(|e| panic!("parse error: {e}"));
        compile(&ast).unwrap_or_else(|e| panic!("compile error: {e}"))
    }

    #[test]
    fn for_loop_with_descending_range_terminates() {
        let program = compile_src(
            "VAR i: INT; n: INT; END_VAR
             FOR i := 5 TO 0 BY -1 DO
               n := n + 1;
             END_FOR;",
        );
        // Must contain a conditional backward jump rather than an
        // unconditional one, or this loop would never terminate.
        assert!(program.instructions.iter().any(|i| i.opcode == Opcode::Ge));
    }

    #[test]
    fn for_loop_bound_already_satisfied_runs_zero_times() {
        let program = compile_src(
            "VAR i: INT; END_VAR
             FOR i := 10 TO 0 DO
             END_FOR;",
        );
        assert!(program.instructions.iter().any(|i| i.opcode == Opcode::Le));
    }

    #[test]
    fn case_reuses_a_single_scrutinee_evaluation() {
        let program = compile_src(
            "VAR x: INT; y: INT; END_VAR
             CASE x OF
               1: y := 1;
               2: y := 2;
             END_CASE;",
        );
        let push_var_count = program.instructions.iter().filter(|i| i.opcode == Opcode::PushVar).count();
        // scrutinee pushed once per branch comparison (2) plus the initial
        // evaluation of `x` itself — never re-evaluates the CASE expression.
        assert!(push_var_count >= 2);
    }

    #[test]
    fn exit_outside_loop_is_a_compile_error() {
        let ast = parser::parse("EXIT;").unwrap();
        let err = compile(&ast).unwrap_err();
        assert!(err.message.contains("EXIT"));
    }

    #[test]
    fn remote_write_discards_the_builtins_return_value() {
        let program = compile_src("MB_WRITE_HOLDING(1, 100) := 42;");
        let last_before_halt = program.instructions[program.instructions.len() - 2];
        assert_eq!(last_before_halt.opcode, Opcode::Pop);
    }

    #[test]
    fn undeclared_variable_is_a_compile_error() {
        let ast = parser::parse("x := 1;").unwrap();
        let err = compile(&ast).unwrap_err();
        assert_eq!(err.message, "Unknown variable: x");
    }

    #[test]
    fn scale_compiles_with_its_full_five_argument_arity() {
        let program = compile_src("VAR x: REAL; END_VAR x := SCALE(5, 0, 10, 0, 100);");
        let call = program.instructions.iter().find(|i| i.opcode == Opcode::CallBuiltin).unwrap();
        assert_eq!(call.builtin_id(), builtins::lookup("SCALE").unwrap().id);
    }
}
