//! Macros that generate the startup boilerplate of nrfblink firmware.
//!
//! The generated items are placed into the `.vector_table.*` sections
//! expected by the `link.x` script of the `blinky` crate:
//!
//! - `.vector_table.reset_vector`: [`macro@entrypoint`].
//! - `.vector_table.exceptions`: `nrfblink::cpu::__EXCEPTIONS`.
//! - `.vector_table.interrupts`: [`macro@interrupt_vector_table`].

use std::collections::HashSet;

use proc_macro::TokenStream;

use quote::{format_ident, quote};
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Ident, ItemFn, ReturnType, Token, Type};

/// Generates the boilerplate required to call the provided function on
/// reset.
///
/// The function must not take arguments and must return `!`. The generated
/// reset handler initializes `.bss` and `.data` before calling it.
///
/// It also generates a panic handler that prints the panic location and
/// message over RTT and then sleeps forever.
#[proc_macro_attribute]
pub fn entrypoint(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item_fn = parse_macro_input!(item as ItemFn);

    if !item_fn.sig.inputs.is_empty() || !returns_never(&item_fn.sig.output)
    {
        panic!("the entrypoint must have signature `fn() -> !`");
    }

    let fname_rust = &item_fn.sig.ident;

    let tokens = quote! {
        #[no_mangle]
        unsafe extern "C" fn _nrfblink_reset() -> ! {
            nrfblink::cpu::init_ram();
            #fname_rust()
        }

        #[link_section = ".vector_table.reset_vector"]
        #[no_mangle]
        #[used]
        static __RESET_VECTOR: unsafe extern "C" fn() -> ! = _nrfblink_reset;

        #[panic_handler]
        fn panic(info: &core::panic::PanicInfo) -> ! {
            nrfblink::print!("\r\n\r\n!!! PANIC !!!\r\n\r\n");

            if let Some(location) = info.location() {
                nrfblink::print!("{}:{}", location.file(), location.line());
            }

            nrfblink::println!(": {}", info.message());

            loop {
                nrfblink::cpu::wfi();
            }
        }

        #item_fn
    };

    tokens.into()
}

/// Returns true if `output` is `-> !`.
fn returns_never(output: &ReturnType) -> bool {
    matches!(output, ReturnType::Type(_, ty) if matches!(**ty, Type::Never(_)))
}

/// Generates the boilerplate required to call the provided function as an
/// interrupt handler.
///
/// The handler is referenced by its name in
/// [`macro@interrupt_vector_table`].
#[proc_macro_attribute]
pub fn interrupt_handler(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item_fn = parse_macro_input!(item as ItemFn);

    if !item_fn.sig.inputs.is_empty() {
        panic!("interrupt handlers cannot take arguments");
    }

    let fname_rust = &item_fn.sig.ident;
    let fname_c = format_ident!("_nrfblink_irq_{}", fname_rust);

    let tokens = quote! {
        #[no_mangle]
        unsafe extern "C" fn #fname_c() {
            #fname_rust()
        }

        #item_fn
    };

    tokens.into()
}

/// Represents an entry of the [interrupt_vector_table] macro.
struct InterruptVectorTableEntry {
    /// Variant of `nrfblink::nvic::Irq`.
    irq: Ident,

    /// Handler annotated with [`macro@interrupt_handler`].
    handler: Ident,
}

impl Parse for InterruptVectorTableEntry {
    fn parse(input: ParseStream) -> syn::Result<InterruptVectorTableEntry> {
        let irq = input.parse()?;
        input.parse::<Token![=>]>()?;
        let handler = input.parse()?;
        Ok(InterruptVectorTableEntry { irq, handler })
    }
}

/// Represents the parameters of the [interrupt_vector_table] macro.
struct InterruptVectorTableParams(
    Punctuated<InterruptVectorTableEntry, Token![,]>,
);

impl Parse for InterruptVectorTableParams {
    fn parse(input: ParseStream) -> syn::Result<InterruptVectorTableParams> {
        let params = Punctuated::parse_terminated(input)?;
        Ok(InterruptVectorTableParams(params))
    }
}

/// Generates the device interrupt vector table.
///
/// It takes a list of `Irq => handler` entries, where `Irq` is a variant of
/// `nrfblink::nvic::Irq` and `handler` a function annotated with
/// [`macro@interrupt_handler`]. The other lines point to
/// `nrfblink::cpu::default_handler`.
///
/// ```text
/// interrupt_vector_table! {
///     Timer0 => timer0_handler,
/// }
/// ```
///
/// Under the hood it creates a symbol called `__INTERRUPTS` placed into a
/// section called `.vector_table.interrupts`. The linker script must keep
/// it, as nothing references it.
#[proc_macro]
pub fn interrupt_vector_table(item: TokenStream) -> TokenStream {
    let entries = parse_macro_input!(item as InterruptVectorTableParams);
    let entries = entries.0;

    let mut seen = HashSet::new();
    for entry in &entries {
        if !seen.insert(entry.irq.to_string()) {
            panic!("duplicated interrupt: {}", entry.irq);
        }
    }

    let irqs = entries.iter().map(|e| &e.irq);
    let fnames_c = entries
        .iter()
        .map(|e| format_ident!("_nrfblink_irq_{}", e.handler))
        .collect::<Vec<Ident>>();

    let tokens = quote! {
        #[link_section = ".vector_table.interrupts"]
        #[no_mangle]
        #[used]
        static __INTERRUPTS: [nrfblink::cpu::Vector; nrfblink::nvic::NIRQS] = {
            let mut table =
                [nrfblink::cpu::Vector::DEFAULT; nrfblink::nvic::NIRQS];
            #(
                table[nrfblink::nvic::Irq::#irqs as usize] =
                    nrfblink::cpu::Vector::handler(#fnames_c);
            )*
            table
        };
    };

    tokens.into()
}
